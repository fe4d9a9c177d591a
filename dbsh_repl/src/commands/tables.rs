use crate::commands::{CommandOptions, LoopCondition, Result, ShellCommand};
use async_trait::async_trait;

/// List the tables in the current database; the aliases are rebuilt from the listing
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn description(&self) -> &'static str {
        "List the tables in the current database"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let output = options.output;
        let tables = options.connection.collections().await?;

        for name in &tables {
            writeln!(output, "{name}")?;
        }
        options.session.aliases.refresh(&tables);

        Ok(LoopCondition::Continue)
    }
}
