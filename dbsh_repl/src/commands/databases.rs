use crate::commands::{CommandOptions, LoopCondition, Result, ShellCommand};
use async_trait::async_trait;

/// List the databases on the server
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "databases"
    }

    fn description(&self) -> &'static str {
        "List the databases on the server"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let output = options.output;
        let current = options.session.database.as_str();

        for database in options.connection.databases().await? {
            let marker = if database == current { " *" } else { "" };
            writeln!(output, "{database}{marker}")?;
        }

        Ok(LoopCondition::Continue)
    }
}
