use crate::Session;
use crate::commands::Result;
use dbsh_core::Configuration;
use dbsh_driver::Results;
use dbsh_formatters::writers::Output;
use dbsh_formatters::{FormatterManager, FormatterOptions};
use std::time::Duration;

/// Formatter options for the configured results settings
pub(crate) fn formatter_options(configuration: &Configuration, elapsed: Duration) -> FormatterOptions {
    FormatterOptions {
        color: configuration.color,
        elapsed,
        footer: configuration.results_footer,
        header: configuration.results_header,
        locale: configuration.locale.name().to_string(),
        no_results: true,
        timer: configuration.results_timer,
    }
}

/// Write results with the session's current format. At most `results.limit` rows are written;
/// the complete results become the session's `$`.
pub(crate) async fn display(
    configuration: &Configuration,
    formatter_manager: &FormatterManager,
    session: &mut Session,
    output: &mut Output,
    results: Results,
    elapsed: Duration,
) -> Result<()> {
    let format = session.format(configuration);
    let formatter =
        formatter_manager
            .get(format)
            .ok_or_else(|| dbsh_formatters::Error::UnknownFormat {
                format: format.to_string(),
            })?;
    let options = formatter_options(configuration, elapsed);
    let limit = configuration.results_limit;

    match &results {
        Results::Query(query_result) if limit > 0 && query_result.len() > limit => {
            let limited = Results::Query(query_result.clone().limit(limit));
            formatter.format(&options, &limited, output).await?;
        }
        _ => formatter.format(&options, &results, output).await?,
    }

    if results != Results::Empty {
        session.last_result = Some(results);
    }
    Ok(())
}
