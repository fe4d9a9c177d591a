//! Lenient parsing of command arguments.
//!
//! Malformed argument text never aborts a command: it is replaced by an empty structure and a
//! warning is written to the output.

use crate::commands::Result;
use colored::Colorize;
use dbsh_driver::literal::{self, ParseError};
use dbsh_driver::{Document, Value};
use dbsh_formatters::writers::Output;
use tracing::warn;

/// Parse a filter or projection document; missing text is an empty document.
pub(crate) fn document(output: &mut Output, text: Option<&str>) -> Result<Document> {
    let Some(text) = text else {
        return Ok(Document::new());
    };
    match literal::parse_document(text) {
        Ok(document) => Ok(document),
        Err(error) => {
            warning(output, text, &error, "an empty document")?;
            Ok(Document::new())
        }
    }
}

/// Parse an aggregation pipeline; malformed text is an empty pipeline.
pub(crate) fn pipeline(output: &mut Output, text: &str) -> Result<Vec<Document>> {
    match literal::parse_pipeline(text) {
        Ok(pipeline) => Ok(pipeline),
        Err(error) => {
            warning(output, text, &error, "an empty pipeline")?;
            Ok(Vec::new())
        }
    }
}

/// Parse a statement parameter; text that is not a literal is taken as a string.
pub(crate) fn parameter(text: &str) -> Value {
    literal::parse(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// A collection, field, database or file name; quoted names may contain whitespace.
pub(crate) fn name(token: &str) -> String {
    if token.starts_with(['\'', '"']) {
        if let Ok(Value::String(name)) = literal::parse(token) {
            return name;
        }
    }
    token.to_string()
}

fn warning(output: &mut Output, text: &str, error: &ParseError, fallback: &str) -> Result<()> {
    warn!("Unable to parse argument [{text}]: {error}");
    writeln!(
        output,
        "{}: unable to parse {text}: {error}; using {fallback}",
        "Warning".yellow()
    )?;
    Ok(())
}
