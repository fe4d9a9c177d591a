use crate::error::Result;
use crate::footer::{write_footer, write_no_results};
use crate::formatter::FormatterOptions;
use crate::writers::Output;
use async_trait::async_trait;
use dbsh_driver::{QueryResult, Results, Value};
use num_format::Locale;
use std::str::FromStr;
use tabled::builder::Builder;
use tabled::settings::object::{Cell, Rows};
use tabled::settings::{Alignment, Style, Theme};

/// Border style of a table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Border {
    Ascii,
    Unicode,
}

impl Border {
    fn theme(self) -> Theme {
        match self {
            Border::Ascii => Theme::from_style(Style::ascii()),
            Border::Unicode => Theme::from_style(Style::modern()),
        }
    }
}

/// Columnar table formatter; `ascii` and `unicode` differ only in their borders.
#[derive(Debug)]
pub(crate) struct TableFormatter {
    border: Border,
}

impl TableFormatter {
    pub(crate) fn new(border: Border) -> Self {
        Self { border }
    }
}

#[async_trait]
impl crate::Formatter for TableFormatter {
    fn identifier(&self) -> &'static str {
        match self.border {
            Border::Ascii => "ascii",
            Border::Unicode => "unicode",
        }
    }

    async fn format(
        &self,
        options: &FormatterOptions,
        results: &Results,
        output: &mut Output,
    ) -> Result<()> {
        format(self.border, options, results, output).await
    }
}

/// Format results as a table and write to the output.  Scalar values are written as is.
async fn format(
    border: Border,
    options: &FormatterOptions,
    results: &Results,
    output: &mut Output,
) -> Result<()> {
    match results {
        Results::Query(query_result) => {
            format_table(border, options, results, query_result, output).await
        }
        Results::Value(value) if value.is_nested() => {
            let query_result = results.to_query_result();
            format_table(border, options, results, &query_result, output).await
        }
        Results::Value(value) => {
            writeln!(output, "{value}")?;
            Ok(())
        }
        Results::Execute(_) => write_footer(options, results, 0, output).await,
        Results::Empty => Ok(()),
    }
}

async fn format_table(
    border: Border,
    options: &FormatterOptions,
    results: &Results,
    query_result: &QueryResult,
    output: &mut Output,
) -> Result<()> {
    if query_result.is_empty() && options.no_results {
        return write_no_results(options, output).await;
    }

    let mut builder = Builder::default();

    if options.header {
        builder.push_record(query_result.columns());
    }

    let (rows, cells) = process_data(options, query_result, &mut builder)?;

    let mut table = builder.build();
    table.with(border.theme());

    if options.header {
        table.modify(Rows::first(), Alignment::center());
    }

    // Align numeric columns to the right
    for cell in cells {
        table.modify(cell, Alignment::right());
    }

    writeln!(output, "{table}")?;
    write_footer(options, results, rows, output).await
}

fn process_data(
    options: &FormatterOptions,
    query_result: &QueryResult,
    builder: &mut Builder,
) -> Result<(u64, Vec<Cell>)> {
    let mut rows: u64 = 0;
    let mut cells = Vec::new();
    let locale = Locale::from_str(&options.locale).unwrap_or(Locale::en);

    for row in query_result.rows() {
        let mut row_data = Vec::new();

        for (column, data) in row.iter().enumerate() {
            if data.is_numeric() {
                let row = if options.header { rows + 1 } else { rows };
                let cell = Cell::new(usize::try_from(row)?, column);
                cells.push(cell);
            }
            let data = match data {
                Value::Null => "null".to_string(),
                data => data.to_formatted_string(&locale),
            };
            row_data.push(data);
        }

        rows += 1;
        builder.push_record(row_data);
    }

    Ok((rows, cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsh_driver::Document;
    use indoc::indoc;
    use crate::Formatter;
    use std::time::Duration;

    const COLUMN_HEADER: &str = "id";

    fn query_result_no_rows() -> Results {
        Results::Query(QueryResult::new(vec![COLUMN_HEADER.to_string()], vec![]))
    }

    fn query_result_one_row() -> Results {
        Results::Query(QueryResult::new(
            vec![COLUMN_HEADER.to_string()],
            vec![vec![Value::I64(12345)]],
        ))
    }

    fn query_result_two_rows() -> Results {
        Results::Query(QueryResult::new(
            vec![COLUMN_HEADER.to_string()],
            vec![vec![Value::Null], vec![Value::I64(12345)]],
        ))
    }

    fn query_result_number_and_string() -> Results {
        Results::Query(QueryResult::new(
            vec![
                "number".to_string(),
                "string".to_string(),
                "text".to_string(),
            ],
            vec![vec![
                Value::I64(42),
                Value::String("foo".to_string()),
                Value::String("Lorem ipsum dolor sit amet".to_string()),
            ]],
        ))
    }

    async fn test_format(
        options: &mut FormatterOptions,
        results: &Results,
    ) -> anyhow::Result<String> {
        let output = &mut Output::default();
        options.elapsed = Duration::from_nanos(9);

        format(Border::Ascii, options, results, output).await?;

        Ok(output.to_string().replace("\r\n", "\n"))
    }

    fn options() -> FormatterOptions {
        FormatterOptions {
            color: false,
            locale: "en".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_table_formatters() -> anyhow::Result<()> {
        let options = FormatterOptions {
            color: false,
            elapsed: Duration::from_nanos(5678),
            ..Default::default()
        };
        let ascii = TableFormatter::new(Border::Ascii);
        let unicode = TableFormatter::new(Border::Unicode);
        assert_eq!(ascii.identifier(), "ascii");
        assert_eq!(unicode.identifier(), "unicode");

        let output = &mut Output::default();
        ascii.format(&options, &query_result_one_row(), output).await?;
        let expected = indoc! {r"
            +--------+
            |   id   |
            +--------+
            | 12,345 |
            +--------+
            1 row (5.678µs)
        "};
        assert_eq!(output.to_string().replace("\r\n", "\n"), expected);

        let output = &mut Output::default();
        unicode.format(&options, &query_result_one_row(), output).await?;
        let expected = indoc! {r"
            ┌────────┐
            │   id   │
            ├────────┤
            │ 12,345 │
            └────────┘
            1 row (5.678µs)
        "};
        assert_eq!(output.to_string().replace("\r\n", "\n"), expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_format() -> anyhow::Result<()> {
        let output = test_format(&mut options(), &Results::Execute(42)).await?;
        assert_eq!(output, "42 rows (9ns)\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_query_format_no_rows() -> anyhow::Result<()> {
        let output = test_format(&mut options(), &query_result_no_rows()).await?;
        assert_eq!(output, "No results\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_query_format_two_rows() -> anyhow::Result<()> {
        let output = test_format(&mut options(), &query_result_two_rows()).await?;
        let expected = indoc! {r"
            +--------+
            |   id   |
            +--------+
            | null   |
            +--------+
            | 12,345 |
            +--------+
            2 rows (9ns)
        "};
        assert_eq!(output, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_query_format_no_header_and_no_footer() -> anyhow::Result<()> {
        let mut options = FormatterOptions {
            footer: false,
            header: false,
            ..options()
        };
        let output = test_format(&mut options, &query_result_one_row()).await?;
        let expected = indoc! {r"
            +--------+
            | 12,345 |
            +--------+
        "};
        assert_eq!(output, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_query_align_numbers_and_strings() -> anyhow::Result<()> {
        let output = test_format(&mut options(), &query_result_number_and_string()).await?;
        let expected = indoc! {r"
            +--------+--------+----------------------------+
            | number | string |            text            |
            +--------+--------+----------------------------+
            |     42 | foo    | Lorem ipsum dolor sit amet |
            +--------+--------+----------------------------+
            1 row (9ns)
        "};
        assert_eq!(output, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_nested_values() -> anyhow::Result<()> {
        let mut address = Document::new();
        address.insert("city".to_string(), Value::from("Paris"));
        let results = Results::Query(QueryResult::new(
            vec!["address".to_string()],
            vec![vec![Value::Map(address)]],
        ));
        let output = test_format(&mut options(), &results).await?;
        assert!(output.contains(r#"{"city":"Paris"}"#));
        Ok(())
    }

    #[tokio::test]
    async fn test_value_format() -> anyhow::Result<()> {
        let output = test_format(&mut options(), &Results::Value(Value::I64(0))).await?;
        assert_eq!(output, "0\n");

        let mut document = Document::new();
        document.insert("ok".to_string(), Value::I64(1));
        let output = test_format(&mut options(), &Results::Value(Value::Map(document))).await?;
        assert!(output.contains("| ok |"));
        assert!(output.contains("1 row"));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_format() -> anyhow::Result<()> {
        let output = test_format(&mut options(), &Results::Empty).await?;
        assert!(output.is_empty());
        Ok(())
    }
}
