use crate::commands::{
    CommandOptions, Error, LoopCondition, Result, ShellCommand, arguments, display,
};
use async_trait::async_trait;
use dbsh_driver::Results;
use std::time::Instant;

/// Show the first entry matching a filter
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "findOne"
    }

    fn args(&self) -> &'static str {
        "<collection> [filter] [projection]"
    }

    fn description(&self) -> &'static str {
        "Show the first entry matching a filter"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let Some(collection) = options.input.get(1) else {
            return Err(Error::missing_arguments(self));
        };
        let collection = arguments::name(collection);
        let output = options.output;
        let filter = arguments::document(output, options.input.get(2).map(String::as_str))?;
        let projection = arguments::document(output, options.input.get(3).map(String::as_str))?;

        let start = Instant::now();
        let query_result = options
            .connection
            .find(&collection, &filter, &projection, 1)
            .await?;
        display(
            options.configuration,
            options.formatter_manager,
            options.session,
            output,
            Results::Query(query_result),
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
    use dbsh_driver::{MockConnection, QueryResult, Value};
    use indoc::indoc;

    #[tokio::test]
    async fn test_execute() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_find()
            .withf(|collection, filter, projection, limit| {
                collection == "users"
                    && filter.get("name") == Some(&Value::from("Ada"))
                    && projection.get("email") == Some(&Value::I64(1))
                    && *limit == 1
            })
            .returning(|_, _, _, _| {
                Ok(QueryResult::new(
                    vec!["_id".to_string(), "email".to_string()],
                    vec![vec![Value::I64(1), Value::from("ada@example.com")]],
                ))
            });

        let (result, output) = run(
            &Command,
            &mut Session::default(),
            &mut connection,
            ".findOne users {name: 'Ada'} {email: 1}",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        let expected = indoc! {r"
            +-----+-----------------+
            | _id |      email      |
            +-----+-----------------+
            |   1 | ada@example.com |
            +-----+-----------------+
            1 row
        "};
        assert_eq!(output, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_no_results() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_find()
            .returning(|_, _, _, _| Ok(QueryResult::default()));

        let (result, output) = run(
            &Command,
            &mut Session::default(),
            &mut connection,
            ".findOne users {name: 'Nobody'}",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        assert_eq!(output, "No results\n");
        Ok(())
    }
}
