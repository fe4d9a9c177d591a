use crate::Session;
use crate::commands::{CommandManager, LoopCondition, display};
use crate::executors::Result;
use crate::executors::command::CommandExecutor;
use crate::executors::expression::ExpressionExecutor;
use dbsh_core::Configuration;
use dbsh_driver::Connection;
use dbsh_formatters::FormatterManager;
use dbsh_formatters::writers::Output;
use std::fmt;
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

/// The line that re-displays the last result
const LAST_RESULT: &str = "$";

/// Routes a line of input to a dot-command, the last result or the connection.
pub struct Executor<'a> {
    configuration: &'a Configuration,
    command_manager: &'a CommandManager,
    formatter_manager: &'a FormatterManager,
    session: &'a mut Session,
    connection: &'a mut dyn Connection,
    output: &'a mut Output,
}

impl<'a> Executor<'a> {
    pub fn new(
        configuration: &'a Configuration,
        command_manager: &'a CommandManager,
        formatter_manager: &'a FormatterManager,
        session: &'a mut Session,
        connection: &'a mut dyn Connection,
        output: &'a mut Output,
    ) -> Executor<'a> {
        Self {
            configuration,
            command_manager,
            formatter_manager,
            session,
            connection,
            output,
        }
    }

    /// Execute a line of input and return the loop condition.
    ///
    /// # Errors
    /// * If the command is unknown or fails
    /// * If the connection fails to evaluate the input
    pub async fn execute(&mut self, input: &str) -> Result<LoopCondition> {
        let input = input.trim();

        if input.is_empty() {
            return Ok(LoopCondition::Continue);
        }

        if input.starts_with('.') {
            debug!("Dispatching command: {input}");
            let mut executor = CommandExecutor::new(
                self.configuration,
                self.command_manager,
                self.formatter_manager,
                self.session,
                self.connection,
                self.output,
            );
            executor.execute(input).await
        } else if input == LAST_RESULT {
            self.display_last_result().await
        } else {
            debug!("Evaluating: {input}");
            let mut executor = ExpressionExecutor::new(
                self.configuration,
                self.formatter_manager,
                self.session,
                self.connection,
                self.output,
            );
            executor.execute(input).await
        }
    }

    async fn display_last_result(&mut self) -> Result<LoopCondition> {
        let Some(results) = self.session.last_result.clone() else {
            writeln!(self.output, "No previous result")?;
            return Ok(LoopCondition::Continue);
        };

        display(
            self.configuration,
            self.formatter_manager,
            self.session,
            self.output,
            results,
            Duration::default(),
        )
        .await?;
        Ok(LoopCondition::Continue)
    }
}

impl Debug for Executor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("configuration", &self.configuration)
            .field("command_manager", &self.command_manager)
            .field("formatter_manager", &self.formatter_manager)
            .field("session", &self.session)
            .field("connection", &self.connection)
            .finish()
    }
}
