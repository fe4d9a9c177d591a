use crate::commands::{
    CommandOptions, Error, LoopCondition, Result, ShellCommand, arguments, display,
};
use async_trait::async_trait;
use dbsh_driver::{QueryResult, Results};
use std::time::Instant;

/// List the distinct values of a field
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "distinct"
    }

    fn args(&self) -> &'static str {
        "<collection> <field> [filter]"
    }

    fn description(&self) -> &'static str {
        "List the distinct values of a field"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let (Some(collection), Some(field)) = (options.input.get(1), options.input.get(2)) else {
            return Err(Error::missing_arguments(self));
        };
        let collection = arguments::name(collection);
        let field = arguments::name(field);
        let filter = arguments::document(options.output, options.input.get(3).map(String::as_str))?;

        let start = Instant::now();
        let values = options.connection.distinct(&collection, &field, &filter).await?;
        let query_result = QueryResult::from_values(field.as_str(), values);
        display(
            options.configuration,
            options.formatter_manager,
            options.session,
            options.output,
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
    use dbsh_driver::{MockConnection, Value};
    use indoc::indoc;

    #[tokio::test]
    async fn test_execute() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_distinct()
            .withf(|collection, field, filter| {
                collection == "users" && field == "city" && filter.len() == 1
            })
            .returning(|_, _, _| Ok(vec![Value::from("Lyon"), Value::from("Paris")]));

        let (result, output) = run(
            &Command,
            &mut Session::default(),
            &mut connection,
            ".distinct users city {active: true}",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        let expected = indoc! {r"
            +-------+
            | city  |
            +-------+
            | Lyon  |
            +-------+
            | Paris |
            +-------+
            2 rows
        "};
        assert_eq!(output, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_missing_field() {
        let (result, _) = run(
            &Command,
            &mut Session::default(),
            &mut MockConnection::new(),
            ".distinct users",
        )
        .await;

        let error = result.expect_err("expected missing argument");
        assert_eq!(
            error.to_string(),
            "distinct is missing a required argument: <collection> <field> [filter]"
        );
    }
}
