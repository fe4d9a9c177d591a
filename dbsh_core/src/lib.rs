#![forbid(unsafe_code)]

pub mod configuration;
pub mod version;

pub use configuration::{Configuration, ConfigurationBuilder};
