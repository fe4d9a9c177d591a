use crate::commands::{CommandOptions, LoopCondition, Result, ShellCommand};
use async_trait::async_trait;
use colored::Colorize;

/// Show the help message
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Show this help message"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let output = options.output;
        let command_manager = options.command_manager;
        let width = command_manager
            .iter()
            .map(|command| command.name().len() + command.args().len() + 1)
            .max()
            .unwrap_or_default();

        for command in command_manager.iter() {
            let name = command.name();
            let arg_width = width - name.len();
            let args = if command.args().is_empty() {
                format!("{:arg_width$}", command.args())
            } else {
                format!(" {:width$}", command.args(), width = arg_width - 1)
            };
            writeln!(
                output,
                "{}{}  {}",
                format!(".{name}").bold(),
                args.dimmed(),
                command.description(),
            )?;
        }

        writeln!(output)?;
        writeln!(
            output,
            "Any other input is evaluated against the current database; '{}' shows the last result.",
            "$".bold()
        )?;
        Ok(LoopCondition::Continue)
    }
}
