use crate::commands::{
    CommandOptions, Error, LoopCondition, Result, ShellCommand, arguments, display,
};
use async_trait::async_trait;
use dbsh_driver::Results;
use std::time::Instant;

/// Describe the fields or columns of a collection
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "describe"
    }

    fn args(&self) -> &'static str {
        "<collection>"
    }

    fn description(&self) -> &'static str {
        "Describe the fields of a collection"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let Some(collection) = options.input.get(1) else {
            return Err(Error::missing_arguments(self));
        };
        let collection = arguments::name(collection);

        let start = Instant::now();
        let description = options.connection.describe(&collection).await?;
        if description.is_empty() {
            return Err(Error::InvalidOption {
                command_name: self.name().to_string(),
                option: collection,
            });
        }

        display(
            options.configuration,
            options.formatter_manager,
            options.session,
            options.output,
            Results::Query(description),
            start.elapsed(),
        )
        .await?;

        Ok(LoopCondition::Continue)
    }
}
