use crate::commands::display::formatter_options;
use crate::commands::{CommandOptions, Error, LoopCondition, Result, ShellCommand, arguments};
use async_trait::async_trait;
use dbsh_driver::{Document, Results};
use dbsh_formatters::writers::{FileWriter, Output};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Result reference exported instead of a collection
const LAST_RESULT: &str = "$";

/// Export a collection, or the last result, to a CSV or JSON file
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "export"
    }

    fn args(&self) -> &'static str {
        "<collection|$> [file] [filter]"
    }

    fn description(&self) -> &'static str {
        "Export to a file; .csv files are CSV, others JSON"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let Some(source) = options.input.get(1) else {
            return Err(Error::missing_arguments(self));
        };
        let source = arguments::name(source);
        let output = options.output;

        // A filter may directly follow the collection when the default file is used
        let (file, filter) = match options.input.get(2) {
            Some(argument) if argument.starts_with('{') => (None, Some(argument.as_str())),
            Some(file) => (
                Some(arguments::name(file)),
                options.input.get(3).map(String::as_str),
            ),
            None => (None, None),
        };

        let start = Instant::now();
        let results = if source == LAST_RESULT {
            match &options.session.last_result {
                Some(results) => results.clone(),
                None => {
                    return Err(Error::InvalidOption {
                        command_name: self.name().to_string(),
                        option: "$ (there is no result to export)".to_string(),
                    });
                }
            }
        } else {
            let filter = arguments::document(output, filter)?;
            let query_result = options
                .connection
                .find(&source, &filter, &Document::new(), 0)
                .await?;
            Results::Query(query_result)
        };

        let path = export_path(&source, file.as_deref())?;
        let format = export_format(&path);
        let formatter = options.formatter_manager.get(format).ok_or_else(|| {
            dbsh_formatters::Error::UnknownFormat {
                format: format.to_string(),
            }
        })?;
        let mut formatter_options = formatter_options(options.configuration, start.elapsed());
        formatter_options.color = false;
        formatter_options.header = true;
        formatter_options.footer = false;
        formatter_options.no_results = false;

        let query_result = results.to_query_result();
        let rows = query_result.len();
        let mut file_output = Output::new(Box::new(FileWriter::from_path(&path)?));
        formatter
            .format(&formatter_options, &Results::Query(query_result), &mut file_output)
            .await?;
        file_output.flush()?;

        info!("Exported {rows} rows from {source} to {}", path.display());
        let label = if rows == 1 { "row" } else { "rows" };
        writeln!(output, "Exported {rows} {label} to {}", path.display())?;
        Ok(LoopCondition::Continue)
    }
}

/// The file to export to; relative paths resolve against the working directory and the default
/// is `<collection>.json`.
fn export_path(source: &str, file: Option<&str>) -> Result<PathBuf> {
    let file = match file {
        Some(file) => PathBuf::from(file),
        None if source == LAST_RESULT => PathBuf::from("result.json"),
        None => PathBuf::from(format!("{source}.json")),
    };
    Ok(std::path::absolute(file)?)
}

/// The formatter for a file: `csv` for a `.csv` extension, `json` otherwise
fn export_format(path: &Path) -> &'static str {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some(extension) if extension.eq_ignore_ascii_case("csv") => "csv",
        _ => "json",
    }
}
