use crate::Session;
use crate::commands::error::Result;
use crate::commands::{
    aggregate, clear, collections, count, databases, describe, distinct, exit, export, find_one,
    help, indexes, pretty, query, queryp, quit, stats, tables, top, use_database,
};
use async_trait::async_trait;
use dbsh_core::Configuration;
use dbsh_driver::Connection;
use dbsh_formatters::FormatterManager;
use dbsh_formatters::writers::Output;
use std::fmt::Debug;

/// Loop condition for commands
///
/// `Continue`: Continue the loop
/// `Exit`: Exit the loop with the specified exit code
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoopCondition {
    Continue,
    Exit(i32),
}

/// Options for commands
pub struct CommandOptions<'a> {
    pub configuration: &'a Configuration,
    pub command_manager: &'a CommandManager,
    pub formatter_manager: &'a FormatterManager,
    pub session: &'a mut Session,
    pub connection: &'a mut dyn Connection,
    /// The command token followed by the top level argument tokens
    pub input: Vec<String>,
    /// The argument text exactly as entered, without the command token
    pub arguments: String,
    pub output: &'a mut Output,
}

impl Debug for CommandOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandOptions")
            .field("configuration", &self.configuration)
            .field("command_manager", &self.command_manager)
            .field("formatter_manager", &self.formatter_manager)
            .field("session", &self.session)
            .field("connection", &self.connection)
            .field("input", &self.input)
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// Trait that defines a command
#[async_trait]
pub trait ShellCommand: Debug + Send + Sync {
    /// Get the name of the command
    fn name(&self) -> &'static str;
    /// Get the arguments for the command
    fn args(&self) -> &'static str {
        ""
    }
    /// Get the description of the command
    fn description(&self) -> &'static str;
    /// Execute the command
    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition>;
}

/// Manages the active commands
#[derive(Debug)]
pub struct CommandManager {
    commands: Vec<Box<dyn ShellCommand>>,
}

impl CommandManager {
    /// Create a new instance of the `CommandManager` struct
    #[must_use]
    pub fn new() -> Self {
        CommandManager {
            commands: Vec::new(),
        }
    }

    /// Commands for a MongoDB shell
    #[must_use]
    pub fn mongodb() -> Self {
        let mut commands = CommandManager::default();
        commands.add(Box::new(aggregate::Command));
        commands.add(Box::new(collections::Command));
        commands
    }

    /// Commands for a PostgreSQL shell
    #[must_use]
    pub fn postgresql() -> Self {
        let mut commands = CommandManager::default();
        commands.add(Box::new(query::Command));
        commands.add(Box::new(queryp::Command));
        commands.add(Box::new(tables::Command));
        commands
    }

    /// Add a new command to the list of available commands; commands are kept sorted by name
    pub fn add(&mut self, command: Box<dyn ShellCommand>) {
        self.commands.push(command);
        self.commands.sort_by_key(|command| command.name());
    }

    /// Get a command by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn ShellCommand> {
        self.commands
            .iter()
            .find(|command| command.name() == name)
            .map(AsRef::as_ref)
    }

    /// Get an iterator over the available commands
    pub fn iter(&self) -> impl Iterator<Item = &dyn ShellCommand> {
        self.commands.iter().map(AsRef::as_ref)
    }
}

/// Default implementation for the `CommandManager` struct; the commands shared by all shells
impl Default for CommandManager {
    fn default() -> Self {
        let mut commands = CommandManager::new();

        commands.add(Box::new(clear::Command));
        commands.add(Box::new(count::Command));
        commands.add(Box::new(databases::Command));
        commands.add(Box::new(describe::Command));
        commands.add(Box::new(distinct::Command));
        commands.add(Box::new(exit::Command));
        commands.add(Box::new(export::Command));
        commands.add(Box::new(find_one::Command));
        commands.add(Box::new(help::Command));
        commands.add(Box::new(indexes::Command));
        commands.add(Box::new(pretty::Command));
        commands.add(Box::new(quit::Command));
        commands.add(Box::new(stats::Command));
        commands.add(Box::new(top::Command));
        commands.add(Box::new(use_database::Command));

        commands
    }
}
