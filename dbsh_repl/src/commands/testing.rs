use crate::Session;
use crate::commands::{CommandManager, CommandOptions, LoopCondition, Result, ShellCommand};
use dbsh_core::Configuration;
use dbsh_driver::Connection;
use dbsh_driver::literal::split_arguments;
use dbsh_formatters::FormatterManager;
use dbsh_formatters::writers::Output;

/// Configuration with deterministic output: no color, no timer, ascii tables
pub(crate) fn configuration() -> Configuration {
    Configuration {
        color: false,
        results_format: "ascii".to_string(),
        results_timer: false,
        ..Default::default()
    }
}

/// Run a command line the way the command executor does and return the result and the output
pub(crate) async fn run(
    command: &dyn ShellCommand,
    session: &mut Session,
    connection: &mut dyn Connection,
    line: &str,
) -> (Result<LoopCondition>, String) {
    let configuration = configuration();
    let command_manager = CommandManager::mongodb();
    let formatter_manager = FormatterManager::default();
    let mut output = Output::default();
    let arguments = line
        .split_once(char::is_whitespace)
        .map(|(_, arguments)| arguments.trim().to_string())
        .unwrap_or_default();
    let options = CommandOptions {
        configuration: &configuration,
        command_manager: &command_manager,
        formatter_manager: &formatter_manager,
        session,
        connection,
        input: split_arguments(line),
        arguments,
        output: &mut output,
    };

    let result = command.execute(options).await;
    (result, output.to_string().replace("\r\n", "\n"))
}
