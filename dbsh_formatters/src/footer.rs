use crate::FormatterOptions;
use crate::error::Result;
use crate::writers::Output;
use colored::Colorize;
use dbsh_driver::Results;
use num_format::{Locale, ToFormattedString};
use std::io::Write;
use std::str::FromStr;

/// Message written in place of an empty result set
pub(crate) const NO_RESULTS: &str = "No results";

/// Display the footer of the result set: the number of rows, grouped for the locale, and the
/// elapsed time when the timer is enabled.
///
/// Example: "N,NNN,NNN rows (M.MMMs)"
pub(crate) async fn write_footer(
    options: &FormatterOptions,
    results: &Results,
    query_rows: u64,
    output: &mut Output,
) -> Result<()> {
    if !options.footer {
        return Ok(());
    }

    let rows = match results {
        Results::Execute(rows_affected) => *rows_affected,
        _ => query_rows,
    };
    let locale = Locale::from_str(&options.locale).unwrap_or(Locale::en);
    let rows_label = if rows == 1 {
        "1 row".to_string()
    } else {
        format!("{} rows", rows.to_formatted_string(&locale))
    };

    if options.timer {
        let elapsed = format!("({:?})", options.elapsed);
        if options.color {
            writeln!(output, "{rows_label} {}", elapsed.dimmed())?;
        } else {
            writeln!(output, "{rows_label} {elapsed}")?;
        }
    } else {
        writeln!(output, "{rows_label}")?;
    }

    output.flush()?;
    Ok(())
}

/// Write the explicit message shown for a result set without rows.
pub(crate) async fn write_no_results(options: &FormatterOptions, output: &mut Output) -> Result<()> {
    if options.color {
        writeln!(output, "{}", NO_RESULTS.dimmed())?;
    } else {
        writeln!(output, "{NO_RESULTS}")?;
    }
    Ok(())
}
