use crate::commands::{CommandOptions, Error, LoopCondition, Result, ShellCommand, arguments};
use async_trait::async_trait;
use tracing::info;

/// Switch the current database
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "use"
    }

    fn args(&self) -> &'static str {
        "<database>"
    }

    fn description(&self) -> &'static str {
        "Switch to a database and alias its collections"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let Some(database) = options.input.get(1) else {
            return Err(Error::missing_arguments(self));
        };
        let database = arguments::name(database);

        options.connection.use_database(&database).await?;
        options.session.refresh(options.connection).await?;
        info!("Using database {database}");

        let session = options.session;
        writeln!(
            options.output,
            "Switched to database {} ({} aliases)",
            session.database,
            session.aliases.len()
        )?;
        Ok(LoopCondition::Continue)
    }
}
