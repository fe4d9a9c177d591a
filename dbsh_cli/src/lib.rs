#![forbid(unsafe_code)]

//! Entry points shared by the `dbsh-mongo` and `dbsh-pg` binaries.

mod prompt;

use anyhow::Result;
use colored::Colorize;
use dbsh_core::configuration::ConfigurationBuilder;
use dbsh_core::version::full_version;
use dbsh_core::{Configuration, version};
use dbsh_driver::DriverManager;
use dbsh_formatters::FormatterManager;
use dbsh_repl::commands::CommandManager;
use dbsh_repl::shell::ShellBuilder;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// The database a binary is a shell for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flavor {
    MongoDb,
    PostgreSql,
}

impl Flavor {
    #[must_use]
    pub fn program_name(self) -> &'static str {
        match self {
            Flavor::MongoDb => "dbsh-mongo",
            Flavor::PostgreSql => "dbsh-pg",
        }
    }

    fn driver_manager(self) -> DriverManager {
        let mut driver_manager = DriverManager::new();
        match self {
            Flavor::MongoDb => driver_manager.add(Arc::new(dbsh_driver_mongodb::Driver)),
            Flavor::PostgreSql => driver_manager.add(Arc::new(dbsh_driver_postgres::Driver)),
        }
        driver_manager
    }

    fn command_manager(self) -> CommandManager {
        match self {
            Flavor::MongoDb => CommandManager::mongodb(),
            Flavor::PostgreSql => CommandManager::postgresql(),
        }
    }
}

/// Parsed command line arguments common to both binaries.
#[derive(Clone, Debug, Default)]
pub struct Args {
    /// The connection string; prompted for when absent
    pub url: Option<String>,
    /// Display the version and exit
    pub version: bool,
}

/// Load the configuration and run the shell; returns the process exit code.
///
/// # Errors
/// * If the configuration cannot be loaded
/// * If the connection prompt or the shell fails
pub async fn execute(flavor: Flavor, args: Args, output: &mut dyn io::Write) -> Result<i32> {
    let configuration = ConfigurationBuilder::new(flavor.program_name(), env!("CARGO_PKG_VERSION"))
        .with_config()?
        .build()?;
    run(flavor, args, configuration, output).await
}

pub(crate) async fn run(
    flavor: Flavor,
    args: Args,
    configuration: Configuration,
    output: &mut dyn io::Write,
) -> Result<i32> {
    let version = full_version(&configuration);
    info!("{version} initialized");

    if args.version {
        version::execute(&configuration, output)?;
        return Ok(0);
    }

    let url = match args.url {
        Some(url) => url,
        None => prompt::url(flavor)?,
    };

    let shell = ShellBuilder::new()
        .with_driver_manager(flavor.driver_manager())
        .with_command_manager(flavor.command_manager())
        .with_formatter_manager(FormatterManager::default())
        .with_configuration(configuration)
        .build();

    let mut connection = match shell.connect(&url).await {
        Ok(connection) => connection,
        Err(error) => {
            eprintln!("{}: {error}", "Error".red());
            error!("Unable to connect: {error}");
            return Ok(1);
        }
    };
    let exit_code = shell.repl(connection.as_mut()).await?;

    info!("{version} completed");
    Ok(exit_code)
}

/// Convert the outcome of [`execute`] into a process exit code.
#[must_use]
pub fn exit_code(result: Result<i32>) -> ExitCode {
    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(error) => {
            eprintln!("{}: {error}", "Error".red());
            ExitCode::FAILURE
        }
    }
}
