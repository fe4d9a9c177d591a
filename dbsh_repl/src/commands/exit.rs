use crate::commands::{CommandOptions, LoopCondition, Result, ShellCommand};
use async_trait::async_trait;
use tracing::info;

/// Exit the application
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn args(&self) -> &'static str {
        "[code]"
    }

    fn description(&self) -> &'static str {
        "Exit the application"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let exit_code = match options.input.get(1) {
            Some(code) => code.parse()?,
            None => 0,
        };

        options.connection.close().await?;
        info!("Exiting with code {exit_code}");
        Ok(LoopCondition::Exit(exit_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use crate::commands::testing::run;
    use dbsh_driver::MockConnection;

    #[tokio::test]
    async fn test_execute_no_argument() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection.expect_close().times(1).returning(|| Ok(()));

        let (result, _) = run(&Command, &mut Session::default(), &mut connection, ".exit").await;

        assert_eq!(result?, LoopCondition::Exit(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_argument() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection.expect_close().times(1).returning(|| Ok(()));

        let (result, _) = run(&Command, &mut Session::default(), &mut connection, ".exit 3").await;

        assert_eq!(result?, LoopCondition::Exit(3));
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_invalid() {
        let mut connection = MockConnection::new();

        let (result, _) = run(&Command, &mut Session::default(), &mut connection, ".exit foo").await;

        assert!(result.is_err());
    }
}
