#![forbid(unsafe_code)]

use clap::Parser;
use dbsh_cli::{Args, Flavor, execute, exit_code};
use std::io;
use std::process::ExitCode;

/// An interactive shell for PostgreSQL
#[derive(Debug, Parser)]
#[command(name = "dbsh-pg", disable_version_flag = true)]
struct Cli {
    /// The PostgreSQL connection string
    #[arg(short, long, env = "DATABASE_URL")]
    url: Option<String>,

    /// Display the version of this tool
    #[arg(long)]
    version: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let args = Args {
        url: cli.url,
        version: cli.version,
    };
    exit_code(execute(Flavor::PostgreSql, args, &mut io::stdout()).await)
}
