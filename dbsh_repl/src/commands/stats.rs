use crate::commands::{CommandOptions, LoopCondition, Result, ShellCommand, arguments, display};
use async_trait::async_trait;
use dbsh_driver::Results;
use std::time::Instant;

/// Show statistics for the database or a collection
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn args(&self) -> &'static str {
        "[collection]"
    }

    fn description(&self) -> &'static str {
        "Show statistics for the database or a collection"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let collection = options
            .input
            .get(1)
            .map_or_else(String::new, |collection| arguments::name(collection));

        let start = Instant::now();
        let stats = options.connection.stats(&collection).await?;
        display(
            options.configuration,
            options.formatter_manager,
            options.session,
            options.output,
            Results::Query(stats),
            start.elapsed(),
        )
        .await?;

        Ok(LoopCondition::Continue)
    }
}
