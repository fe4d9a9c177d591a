use dbsh_core::Configuration;
use dbsh_driver::{Aliases, Connection, Results};
use tracing::debug;

/// Mutable state of one interactive session, handed to every command.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    /// The currently selected database
    pub database: String,
    /// Render results as structured JSON instead of tables
    pub pretty: bool,
    /// The last displayed result, available as `$`
    pub last_result: Option<Results>,
    pub aliases: Aliases,
}

impl Session {
    #[must_use]
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            pretty: configuration.results_pretty,
            ..Default::default()
        }
    }

    /// The prompt for the current database, e.g. `inventory> `
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{}> ", self.database)
    }

    /// Flip the pretty output toggle and return the new state
    pub fn toggle_pretty(&mut self) -> bool {
        self.pretty = !self.pretty;
        self.pretty
    }

    /// The formatter identifier to render results with
    #[must_use]
    pub fn format<'a>(&self, configuration: &'a Configuration) -> &'a str {
        if self.pretty {
            "json"
        } else {
            configuration.results_format.as_str()
        }
    }

    /// Re-read the current database from the connection and rebuild the aliases for its
    /// collections.
    ///
    /// # Errors
    /// * If the collections cannot be listed
    pub async fn refresh(&mut self, connection: &mut dyn Connection) -> dbsh_driver::Result<()> {
        self.database = connection.database();
        let collections = connection.collections().await?;
        self.aliases.refresh(&collections);
        debug!(
            "Session refreshed for database {}: {} aliases",
            self.database,
            self.aliases.len()
        );
        Ok(())
    }
}
