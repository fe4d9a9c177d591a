use crate::commands::{
    CommandOptions, Error, LoopCondition, Result, ShellCommand, arguments, display,
};
use async_trait::async_trait;
use dbsh_driver::{Value, convert_to_numbered_placeholders};
use dbsh_driver::literal::split_list;
use std::time::Instant;
use tracing::debug;

/// Execute a SQL statement with positional parameters
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "queryp"
    }

    fn args(&self) -> &'static str {
        "<sql>; <param>, ..."
    }

    fn description(&self) -> &'static str {
        "Execute a SQL statement with ? or $n parameters"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let (sql, parameters) = split_statement(&options.arguments);
        if sql.is_empty() {
            return Err(Error::missing_arguments(self));
        }
        let parameters: Vec<Value> = split_list(parameters)
            .iter()
            .map(|parameter| arguments::parameter(parameter))
            .collect();
        let sql = convert_to_numbered_placeholders(sql);
        debug!("Executing [{sql}] with {} parameters", parameters.len());

        let start = Instant::now();
        let results = options.connection.query(&sql, &parameters).await?;
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

/// Split `<sql>; <parameters>` at the last semicolon outside of quoted text.
fn split_statement(text: &str) -> (&str, &str) {
    let mut quote: Option<char> = None;
    let mut separator = None;

    for (index, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == ';' => separator = Some(index),
            None => {}
        }
    }

    match separator {
        Some(index) => (text[..index].trim(), text[index + 1..].trim()),
        None => (text.trim(), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use crate::commands::testing::run;
    use dbsh_driver::{MockConnection, QueryResult, Results};

    #[test]
    fn test_split_statement() {
        assert_eq!(
            split_statement("SELECT * FROM t WHERE a = ?; 1"),
            ("SELECT * FROM t WHERE a = ?", "1")
        );
        assert_eq!(
            split_statement("SELECT ';' FROM t WHERE a = $1; 'x;y'"),
            ("SELECT ';' FROM t WHERE a = $1", "'x;y'")
        );
        assert_eq!(split_statement("SELECT 1"), ("SELECT 1", ""));
        assert_eq!(split_statement("SELECT 1;"), ("SELECT 1", ""));
    }

    #[tokio::test]
    async fn test_execute() -> anyhow::Result<()> {
        let mut connection = MockConnection::new();
        connection
            .expect_query()
            .withf(|sql, parameters| {
                sql == "SELECT name FROM users WHERE id = $1 AND city = $2"
                    && parameters == [Value::I64(7), Value::from("Paris")]
            })
            .returning(|_, _| {
                Ok(Results::Query(QueryResult::from_values(
                    "name",
                    vec![Value::from("Ada")],
                )))
            });
        let mut session = Session::default();

        let (result, output) = run(
            &Command,
            &mut session,
            &mut connection,
            ".queryp SELECT name FROM users WHERE id = ? AND city = ?; 7, 'Paris'",
        )
        .await;

        assert_eq!(result?, LoopCondition::Continue);
        assert!(output.contains("Ada"));
        assert!(session.last_result.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_parameter_count() {
        let mut connection = MockConnection::new();
        connection.expect_query().returning(|_, parameters| {
            Err(dbsh_driver::Error::ParameterCount {
                expected: 2,
                actual: parameters.len(),
            })
        });

        let (result, _) = run(
            &Command,
            &mut Session::default(),
            &mut connection,
            ".queryp SELECT * FROM users WHERE id = $1 AND city = $2; 7",
        )
        .await;

        let error = result.expect_err("expected parameter count error");
        assert_eq!(error.to_string(), "expected 2 parameters, received 1");
    }
}
