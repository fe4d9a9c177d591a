use crate::Session;
use crate::commands::{CommandManager, CommandOptions, LoopCondition};
use crate::executors::{Error, Result};
use dbsh_core::Configuration;
use dbsh_driver::Connection;
use dbsh_driver::literal::split_arguments;
use dbsh_formatters::FormatterManager;
use dbsh_formatters::writers::Output;
use indicatif::ProgressStyle;
use std::fmt;
use std::fmt::Debug;
use tracing::{Span, debug, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// A dot-command executor.
pub(crate) struct CommandExecutor<'a> {
    configuration: &'a Configuration,
    command_manager: &'a CommandManager,
    formatter_manager: &'a FormatterManager,
    session: &'a mut Session,
    connection: &'a mut dyn Connection,
    output: &'a mut Output,
}

/// Implementation for [`CommandExecutor`].
impl<'a> CommandExecutor<'a> {
    pub(crate) fn new(
        configuration: &'a Configuration,
        command_manager: &'a CommandManager,
        formatter_manager: &'a FormatterManager,
        session: &'a mut Session,
        connection: &'a mut dyn Connection,
        output: &'a mut Output,
    ) -> CommandExecutor<'a> {
        Self {
            configuration,
            command_manager,
            formatter_manager,
            session,
            connection,
            output,
        }
    }

    /// Execute the command and return the loop condition; a spinner is shown while the command
    /// waits on the database.
    #[instrument(skip(self, line))]
    pub(crate) async fn execute(&mut self, line: &str) -> Result<LoopCondition> {
        Span::current().pb_set_style(&ProgressStyle::with_template(
            "{span_child_prefix}{spinner}",
        )?);
        let input = split_arguments(line);
        let command_name = input
            .first()
            .and_then(|token| token.strip_prefix('.'))
            .unwrap_or_default()
            .to_string();
        let arguments = line
            .split_once(char::is_whitespace)
            .map(|(_, arguments)| arguments.trim().to_string())
            .unwrap_or_default();

        let Some(command) = self.command_manager.get(&command_name) else {
            return Err(Error::InvalidCommand { command_name });
        };
        debug!("Executing command {command_name}");

        let options = CommandOptions {
            configuration: self.configuration,
            command_manager: self.command_manager,
            formatter_manager: self.formatter_manager,
            session: self.session,
            connection: self.connection,
            input,
            arguments,
            output: self.output,
        };
        Ok(command.execute(options).await?)
    }
}

impl Debug for CommandExecutor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("configuration", &self.configuration)
            .field("command_manager", &self.command_manager)
            .field("formatter_manager", &self.formatter_manager)
            .field("session", &self.session)
            .field("connection", &self.connection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsh_driver::MockConnection;
    use tracing_indicatif::IndicatifLayer;
    use tracing_subscriber::layer::SubscriberExt;

    #[tokio::test]
    async fn test_debug() {
        let configuration = Configuration::default();
        let command_manager = CommandManager::default();
        let formatter_manager = FormatterManager::default();
        let mut session = Session::default();
        let mut connection = MockConnection::new();
        let output = &mut Output::default();

        let executor = CommandExecutor::new(
            &configuration,
            &command_manager,
            &formatter_manager,
            &mut session,
            &mut connection,
            output,
        );
        let debug = format!("{executor:?}");
        assert!(debug.contains("CommandExecutor"));
        assert!(debug.contains("configuration"));
        assert!(debug.contains("command_manager"));
        assert!(debug.contains("formatter_manager"));
        assert!(debug.contains("session"));
        assert!(debug.contains("connection"));
    }

    #[tokio::test]
    async fn test_execute_invalid_command() {
        let configuration = Configuration::default();
        let command_manager = CommandManager::default();
        let formatter_manager = FormatterManager::default();
        let mut session = Session::default();
        let mut connection = MockConnection::new();
        let output = &mut Output::default();

        let mut executor = CommandExecutor::new(
            &configuration,
            &command_manager,
            &formatter_manager,
            &mut session,
            &mut connection,
            output,
        );

        let result = executor.execute(".foo bar").await;
        let error = result.expect_err("expected invalid command");
        assert_eq!(error.to_string(), "Invalid command foo");
    }

    #[tokio::test]
    async fn test_execute_passes_raw_arguments() -> anyhow::Result<()> {
        let configuration = Configuration::default();
        let command_manager = CommandManager::postgresql();
        let formatter_manager = FormatterManager::default();
        let mut session = Session::default();
        let mut connection = MockConnection::new();
        connection
            .expect_query()
            .withf(|sql, _| sql == "SELECT  'a b'   FROM t")
            .returning(|_, _| Ok(dbsh_driver::Results::Empty));
        let output = &mut Output::default();

        let mut executor = CommandExecutor::new(
            &configuration,
            &command_manager,
            &formatter_manager,
            &mut session,
            &mut connection,
            output,
        );

        let result = executor.execute(".query SELECT  'a b'   FROM t").await?;
        assert_eq!(result, LoopCondition::Continue);
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_with_progress_layer() -> anyhow::Result<()> {
        let subscriber = tracing_subscriber::registry().with(IndicatifLayer::new());
        let _guard = tracing::subscriber::set_default(subscriber);
        let configuration = Configuration {
            color: false,
            results_format: "ascii".to_string(),
            results_timer: false,
            ..Default::default()
        };
        let command_manager = CommandManager::mongodb();
        let formatter_manager = FormatterManager::default();
        let mut session = Session::default();
        let mut connection = MockConnection::new();
        connection
            .expect_count()
            .withf(|collection, _| collection == "users")
            .returning(|_, _| Ok(12));
        let output = &mut Output::default();

        let mut executor = CommandExecutor::new(
            &configuration,
            &command_manager,
            &formatter_manager,
            &mut session,
            &mut connection,
            output,
        );

        let result = executor.execute(".count users").await?;
        assert_eq!(result, LoopCondition::Continue);
        assert_eq!(output.to_string(), "12\n");
        Ok(())
    }
}
