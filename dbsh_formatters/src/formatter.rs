use crate::error::Result;
use crate::table::{Border, TableFormatter};
use crate::writers::Output;
use async_trait::async_trait;
use dbsh_driver::Results;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Duration;

/// Options for formatters
#[derive(Clone, Debug)]
pub struct FormatterOptions {
    pub color: bool,
    pub elapsed: Duration,
    pub footer: bool,
    pub header: bool,
    pub locale: String,
    /// Write an explicit message instead of an empty result set
    pub no_results: bool,
    pub timer: bool,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        FormatterOptions {
            color: true,
            elapsed: Duration::default(),
            footer: true,
            header: true,
            locale: "en".to_string(),
            no_results: true,
            timer: true,
        }
    }
}

#[async_trait]
pub trait Formatter: Debug + Send + Sync {
    fn identifier(&self) -> &'static str;
    async fn format(
        &self,
        options: &FormatterOptions,
        results: &Results,
        output: &mut Output,
    ) -> Result<()>;
}

/// Manages available formatters
#[derive(Debug)]
pub struct FormatterManager {
    formats: BTreeMap<&'static str, Box<dyn Formatter>>,
}

impl FormatterManager {
    /// Create a new instance of the `FormatterManager`
    #[must_use]
    pub fn new() -> Self {
        FormatterManager {
            formats: BTreeMap::new(),
        }
    }

    /// Add a new format to the list of available formatters
    pub fn add(&mut self, format: Box<dyn Formatter>) {
        let identifier = format.identifier();
        let _ = &self.formats.insert(identifier, format);
    }

    /// Get a formatter by name
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&dyn Formatter> {
        self.formats.get(identifier).map(AsRef::as_ref)
    }

    /// Get an iterator over the available formatters
    pub fn iter(&self) -> impl Iterator<Item = &dyn Formatter> {
        self.formats.values().map(AsRef::as_ref)
    }
}

/// Default implementation for the `FormatterManager`
impl Default for FormatterManager {
    fn default() -> Self {
        let mut formatter_manager = FormatterManager::new();

        formatter_manager.add(Box::new(TableFormatter::new(Border::Ascii)));
        formatter_manager.add(Box::new(crate::csv::Formatter));
        formatter_manager.add(Box::new(crate::json::Formatter));
        formatter_manager.add(Box::new(TableFormatter::new(Border::Unicode)));

        formatter_manager
    }
}
