use crate::commands::{
    CommandOptions, Error, LoopCondition, Result, ShellCommand, arguments, display,
};
use async_trait::async_trait;
use dbsh_driver::{Results, Value};
use std::time::Instant;

/// Count the entries of a collection that match a filter
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "count"
    }

    fn args(&self) -> &'static str {
        "<collection> [filter]"
    }

    fn description(&self) -> &'static str {
        "Count the entries matching a filter"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let Some(collection) = options.input.get(1) else {
            return Err(Error::missing_arguments(self));
        };
        let collection = arguments::name(collection);
        let filter = arguments::document(options.output, options.input.get(2).map(String::as_str))?;

        let start = Instant::now();
        let count = options.connection.count(&collection, &filter).await?;
        display(
            options.configuration,
            options.formatter_manager,
            options.session,
            options.output,
            Results::Value(Value::from(count)),
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
    use dbsh_driver::MockConnection;

    #[tokio::test]
    async fn test_execute() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_count()
            .withf(|collection, filter| {
                collection == "users" && filter.get("status") == Some(&Value::from("A"))
            })
            .returning(|_, _| Ok(42));
        let mut session = Session::default();

        let (result, output) = run(
            &Command,
            &mut session,
            &mut connection,
            ".count users {status: 'A'}",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        assert_eq!(output, "42\n");
        assert_eq!(session.last_result, Some(Results::Value(Value::I64(42))));
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_no_matches() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_count()
            .withf(|collection, filter| collection == "orders" && filter.is_empty())
            .returning(|_, _| Ok(0));

        let (result, output) = run(
            &Command,
            &mut Session::default(),
            &mut connection,
            ".count orders",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        assert_eq!(output, "0\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_quoted_collection() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_count()
            .withf(|collection, filter| collection == "audit log" && filter.len() == 1)
            .times(1)
            .returning(|_, _| Ok(3));

        let (result, output) = run(
            &Command,
            &mut Session::default(),
            &mut connection,
            ".count 'audit log' {level: 'warn'}",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        assert_eq!(output, "3\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_malformed_filter() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_count()
            .withf(|_, filter| filter.is_empty())
            .returning(|_, _| Ok(7));

        let (result, output) = run(
            &Command,
            &mut Session::default(),
            &mut connection,
            ".count users {status:}",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        assert!(output.contains("Warning"));
        assert!(output.ends_with("7\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_no_args() {
        let (result, _) = run(
            &Command,
            &mut Session::default(),
            &mut MockConnection::new(),
            ".count",
        )
        .await;

        assert!(matches!(result, Err(Error::MissingArguments { .. })));
    }
}
