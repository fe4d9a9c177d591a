use crate::commands::{CommandOptions, Error, LoopCondition, Result, ShellCommand, display};
use async_trait::async_trait;
use std::time::Instant;

/// Execute a SQL statement
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "query"
    }

    fn args(&self) -> &'static str {
        "<sql>"
    }

    fn description(&self) -> &'static str {
        "Execute a SQL statement"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let sql = options.arguments.trim();
        if sql.is_empty() {
            return Err(Error::missing_arguments(self));
        }

        let start = Instant::now();
        let results = options.connection.query(sql, &[]).await?;
        display(
            options.configuration,
            options.formatter_manager,
            options.session,
            options.output,
            results,
            start.elapsed(),
        )
        .await?;

        Ok(LoopCondition::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use crate::commands::testing::run;
    use dbsh_driver::{MockConnection, Results};

    #[tokio::test]
    async fn test_execute() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_query()
            .withf(|sql, parameters| {
                sql == "UPDATE users SET active = true WHERE id > 10" && parameters.is_empty()
            })
            .returning(|_, _| Ok(Results::Execute(3)));

        let (result, output) = run(
            &Command,
            &mut Session::default(),
            &mut connection,
            ".query UPDATE users SET active = true WHERE id > 10",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        assert_eq!(output, "3 rows\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_keeps_question_mark_operators() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_query()
            .withf(|sql, parameters| {
                sql == "SELECT id FROM events WHERE data ? 'k' OR data ?| array['a']"
                    && parameters.is_empty()
            })
            .times(1)
            .returning(|_, _| Ok(Results::Execute(0)));

        let (result, _) = run(
            &Command,
            &mut Session::default(),
            &mut connection,
            ".query SELECT id FROM events WHERE data ? 'k' OR data ?| array['a']",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_no_sql() {
        let (result, _) = run(
            &Command,
            &mut Session::default(),
            &mut MockConnection::new(),
            ".query   ",
        )
        .await;

        let error = result.expect_err("expected missing argument");
        assert_eq!(
            error.to_string(),
            "query is missing a required argument: <sql>"
        );
    }
}
