use crate::Error::{DriverNotFound, InvalidUrl};
use crate::error::Result;
use crate::{Connection, Driver};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::instrument;
use url::Url;

/// Manages available drivers
#[derive(Debug, Default)]
pub struct DriverManager {
    drivers: BTreeMap<&'static str, Arc<dyn Driver>>,
}

impl DriverManager {
    /// Create a new instance of the `DriverManager`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new driver to the list of available drivers, keyed by each scheme it handles
    pub fn add(&mut self, driver: Arc<dyn Driver>) {
        for scheme in driver.schemes() {
            let _ = self.drivers.insert(scheme, driver.clone());
        }
    }

    /// Get a driver by URL scheme
    #[must_use]
    pub fn get(&self, scheme: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.get(scheme).cloned()
    }

    /// Get the schemes of all available drivers
    pub fn schemes(&self) -> impl Iterator<Item = &'static str> {
        self.drivers.keys().copied()
    }

    /// Connect to a database
    ///
    /// # Errors
    /// * If the URL cannot be parsed
    /// * If no driver handles the URL scheme
    /// * If the driver fails to connect
    #[instrument(name = "connect", level = "info", skip(self, url))]
    pub async fn connect(&self, url: &str) -> Result<Box<dyn Connection>> {
        let parsed_url = Url::parse(url).map_err(|error| InvalidUrl(error.to_string()))?;
        let scheme = parsed_url.scheme();

        match self.get(scheme) {
            Some(driver) => driver.connect(url).await,
            None => Err(DriverNotFound(scheme.to_string())),
        }
    }
}
