use crate::Session;
use crate::commands::{LoopCondition, display};
use crate::executors::Result;
use dbsh_core::Configuration;
use dbsh_driver::{Connection, Results};
use dbsh_formatters::FormatterManager;
use dbsh_formatters::writers::Output;
use indicatif::ProgressStyle;
use std::fmt;
use std::fmt::Debug;
use std::time::Instant;
use tracing::{Span, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// Evaluates database native input: a MongoDB expression or a SQL statement.
pub(crate) struct ExpressionExecutor<'a> {
    configuration: &'a Configuration,
    formatter_manager: &'a FormatterManager,
    session: &'a mut Session,
    connection: &'a mut dyn Connection,
    output: &'a mut Output,
}

/// Implementation for [`ExpressionExecutor`].
impl<'a> ExpressionExecutor<'a> {
    pub(crate) fn new(
        configuration: &'a Configuration,
        formatter_manager: &'a FormatterManager,
        session: &'a mut Session,
        connection: &'a mut dyn Connection,
        output: &'a mut Output,
    ) -> ExpressionExecutor<'a> {
        Self {
            configuration,
            formatter_manager,
            session,
            connection,
            output,
        }
    }

    /// Evaluate the input and display the results.
    pub(crate) async fn execute(&mut self, input: &str) -> Result<LoopCondition> {
        let start = Instant::now();
        let results = self.evaluate(input).await?;

        display(
            self.configuration,
            self.formatter_manager,
            self.session,
            self.output,
            results,
            start.elapsed(),
        )
        .await?;
        Ok(LoopCondition::Continue)
    }

    /// Evaluate the input and return the results.
    ///
    /// This function is split out so that it can be instrumented and a visual progress indicator
    /// can be shown without leaving artifacts in the output when the results are formatted.
    #[instrument(skip(self, input))]
    async fn evaluate(&mut self, input: &str) -> Result<Results> {
        Span::current().pb_set_style(&ProgressStyle::with_template(
            "{span_child_prefix}{spinner}",
        )?);
        let results = self
            .connection
            .evaluate(input, &self.session.aliases)
            .await?;
        Ok(results)
    }
}

impl Debug for ExpressionExecutor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionExecutor")
            .field("configuration", &self.configuration)
            .field("formatter_manager", &self.formatter_manager)
            .field("session", &self.session)
            .field("connection", &self.connection)
            .finish()
    }
}
