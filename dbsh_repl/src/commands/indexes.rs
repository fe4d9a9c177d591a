use crate::commands::{
    CommandOptions, Error, LoopCondition, Result, ShellCommand, arguments, display,
};
use async_trait::async_trait;
use dbsh_driver::Results;
use std::time::Instant;

/// Command to display index information.
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "indexes"
    }

    fn args(&self) -> &'static str {
        "<collection>"
    }

    fn description(&self) -> &'static str {
        "Display the indexes of a collection"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let Some(collection) = options.input.get(1) else {
            return Err(Error::missing_arguments(self));
        };
        let collection = arguments::name(collection);

        let start = Instant::now();
        let indexes = options.connection.indexes(&collection).await?;
        display(
            options.configuration,
            options.formatter_manager,
            options.session,
            options.output,
            Results::Query(indexes),
            start.elapsed(),
        )
        .await?;

        Ok(LoopCondition::Continue)
    }
}
