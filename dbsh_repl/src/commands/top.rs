use crate::commands::{CommandOptions, LoopCondition, Result, ShellCommand, display};
use async_trait::async_trait;
use dbsh_driver::Results;
use std::time::Instant;

const DEFAULT_LIMIT: usize = 10;

/// Show the busiest collections
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "top"
    }

    fn args(&self) -> &'static str {
        "[limit]"
    }

    fn description(&self) -> &'static str {
        "Show the most used collections (default 10)"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let limit = match options.input.get(1) {
            Some(limit) => limit.parse()?,
            None => DEFAULT_LIMIT,
        };

        let start = Instant::now();
        let top = options.connection.top(limit).await?;
        display(
            options.configuration,
            options.formatter_manager,
            options.session,
            options.output,
            Results::Query(top),
            start.elapsed(),
        )
        .await?;

        Ok(LoopCondition::Continue)
    }
}
