use crate::error::Result;
use crate::footer::write_footer;
use crate::formatter::FormatterOptions;
use crate::writers::Output;
use async_trait::async_trait;
use csv::QuoteStyle;
use dbsh_driver::{Results, Value};

/// A formatter for Comma Separated Values (CSV)
#[derive(Debug, Default)]
pub struct Formatter;

#[async_trait]
impl crate::Formatter for Formatter {
    fn identifier(&self) -> &'static str {
        "csv"
    }

    async fn format(
        &self,
        options: &FormatterOptions,
        results: &Results,
        output: &mut Output,
    ) -> Result<()> {
        if let Results::Execute(_) = results {
            return write_footer(options, results, 0, output).await;
        }
        let rows = format_delimited(options, b',', QuoteStyle::Necessary, results, output)?;
        write_footer(options, results, rows, output).await
    }
}

fn format_delimited(
    options: &FormatterOptions,
    delimiter: u8,
    quote_style: QuoteStyle,
    results: &Results,
    output: &mut Output,
) -> Result<u64> {
    let query_result = results.to_query_result();
    if query_result.columns().is_empty() {
        return Ok(0);
    }

    let mut rows: u64 = 0;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(quote_style)
        .from_writer(output);

    if options.header {
        writer.write_record(query_result.columns())?;
    }

    for row in query_result.rows() {
        let mut csv_row: Vec<Vec<u8>> = Vec::new();

        for data in row {
            let bytes = match data {
                Value::Null => Vec::new(),
                _ => Vec::from(data.to_string().as_bytes()),
            };
            csv_row.push(bytes);
        }
        writer.write_record(csv_row)?;
        rows += 1;
    }
    writer.flush()?;

    Ok(rows)
}
