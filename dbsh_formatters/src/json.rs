use crate::error::Result;
use crate::footer::{write_footer, write_no_results};
use crate::formatter::FormatterOptions;
use crate::writers::Output;
use async_trait::async_trait;
use dbsh_driver::{Results, Value};
use serde_json::to_string_pretty;

/// A formatter for pretty printed JSON; also used for the shell's pretty mode
#[derive(Debug, Default)]
pub struct Formatter;

#[async_trait]
impl crate::Formatter for Formatter {
    fn identifier(&self) -> &'static str {
        "json"
    }

    async fn format(
        &self,
        options: &FormatterOptions,
        results: &Results,
        output: &mut Output,
    ) -> Result<()> {
        format_json(options, results, output).await
    }
}

async fn format_json(
    options: &FormatterOptions,
    results: &Results,
    output: &mut Output,
) -> Result<()> {
    let (json, rows) = match results {
        Results::Query(query_result) => {
            if query_result.is_empty() && options.no_results {
                return write_no_results(options, output).await;
            }
            let documents = query_result.to_documents();
            (to_string_pretty(&documents)?, query_result.len())
        }
        Results::Value(Value::Array(values)) => {
            if values.is_empty() && options.no_results {
                return write_no_results(options, output).await;
            }
            (to_string_pretty(values)?, values.len())
        }
        Results::Value(value) => (to_string_pretty(value)?, 1),
        Results::Execute(_) => return write_footer(options, results, 0, output).await,
        Results::Empty => return Ok(()),
    };

    writeln!(output, "{json}")?;
    if results.is_query() {
        write_footer(options, results, u64::try_from(rows)?, output).await?;
    }
    Ok(())
}
