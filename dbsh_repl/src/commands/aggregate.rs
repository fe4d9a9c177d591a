use crate::commands::{
    CommandOptions, Error, LoopCondition, Result, ShellCommand, arguments, display,
};
use async_trait::async_trait;
use dbsh_driver::Results;
use std::time::Instant;
use tracing::debug;

/// Run an aggregation pipeline against a collection
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "aggregate"
    }

    fn args(&self) -> &'static str {
        "<collection> <pipeline>"
    }

    fn description(&self) -> &'static str {
        "Run an aggregation pipeline"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let (Some(collection), Some(pipeline)) = (options.input.get(1), options.input.get(2))
        else {
            return Err(Error::missing_arguments(self));
        };
        let collection = arguments::name(collection);
        let pipeline = arguments::pipeline(options.output, pipeline)?;
        debug!("Aggregating {collection} with {} stages", pipeline.len());

        let start = Instant::now();
        let query_result = options.connection.aggregate(&collection, &pipeline).await?;
        display(
            options.configuration,
            options.formatter_manager,
            options.session,
            options.output,
            Results::Query(query_result),
            start.elapsed(),
        )
        .await?;

        Ok(LoopCondition::Continue)
    }
}
