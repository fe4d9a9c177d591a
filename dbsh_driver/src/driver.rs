use crate::Connection;
use crate::error::Result;
use async_trait::async_trait;
use mockall::automock;
use std::fmt::Debug;

#[automock]
#[async_trait]
pub trait Driver: Debug + Send + Sync {
    /// URL schemes handled by this driver, e.g. `postgresql`
    fn schemes(&self) -> Vec<&'static str>;
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>>;
}
