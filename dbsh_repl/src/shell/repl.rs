use crate::Session;
use crate::commands::{CommandManager, LoopCondition};
use crate::executors::Executor;
use crate::shell::helper::ReplHelper;
use anyhow::Result;
use colored::Colorize;
use dbsh_core::Configuration;
use dbsh_core::version::full_version;
use dbsh_driver::{Connection, DriverManager};
use dbsh_formatters::FormatterManager;
use dbsh_formatters::writers::{Output, StdoutWriter};
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{CompletionType, Editor};
use tracing::{error, info, warn};

/// A builder for creating a [`Shell`].
pub struct ShellBuilder {
    shell: Shell,
}

impl ShellBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shell: Shell::default(),
        }
    }

    /// Set the driver manager for the shell.
    #[must_use]
    pub fn with_driver_manager(mut self, driver_manager: DriverManager) -> Self {
        self.shell.driver_manager = driver_manager;
        self
    }

    /// Set the command manager for the shell.
    #[must_use]
    pub fn with_command_manager(mut self, command_manager: CommandManager) -> Self {
        self.shell.command_manager = command_manager;
        self
    }

    /// Set the formatter manager for the shell.
    #[must_use]
    pub fn with_formatter_manager(mut self, formatter_manager: FormatterManager) -> Self {
        self.shell.formatter_manager = formatter_manager;
        self
    }

    /// Set the configuration for the shell.
    #[must_use]
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.shell.configuration = configuration;
        self
    }

    /// Build the shell.
    #[must_use]
    pub fn build(self) -> Shell {
        self.shell
    }
}

/// Default implementation for [`ShellBuilder`].
impl Default for ShellBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A shell for interacting with a database.
#[derive(Debug, Default)]
pub struct Shell {
    pub driver_manager: DriverManager,
    pub command_manager: CommandManager,
    pub formatter_manager: FormatterManager,
    pub configuration: Configuration,
}

impl Shell {
    /// Connect to the database at `url`.
    ///
    /// # Errors
    /// * If the URL is invalid, no driver handles it or the connection fails
    pub async fn connect(&self, url: &str) -> Result<Box<dyn Connection>> {
        let connection = self.driver_manager.connect(url).await?;
        info!("Connected to database {}", connection.database());
        Ok(connection)
    }

    /// Run the Read-Eval-Print Loop (REPL) until the user exits; returns the exit code.
    ///
    /// # Errors
    /// * If the line editor cannot be created or the history cannot be saved
    pub async fn repl(&self, connection: &mut dyn Connection) -> Result<i32> {
        let configuration = &self.configuration;
        let history_file = configuration.history_file.as_ref().filter(|_| configuration.history);

        let mut editor = Editor::<ReplHelper, FileHistory>::new()?;
        editor.set_color_mode(configuration.color_mode());
        editor.set_edit_mode(configuration.edit_mode);
        editor.set_completion_type(CompletionType::Circular);
        editor.set_helper(Some(ReplHelper::new(&self.command_manager)));

        if let Some(history_file) = history_file {
            let _ = editor.load_history(history_file);
            editor.set_history_ignore_dups(configuration.history_ignore_dups)?;

            if configuration.history_limit > 0 {
                editor.set_max_history_size(configuration.history_limit)?;
            }
        }

        let mut session = Session::new(configuration);
        if let Err(error) = session.refresh(connection).await {
            warn!("Unable to list collections: {error}");
            session.database = connection.database();
        }
        if let Some(helper) = editor.helper_mut() {
            helper.set_aliases(&session.aliases);
        }

        welcome_message(configuration, &session);

        loop {
            let loop_condition = match editor.readline(&session.prompt()) {
                Ok(line) => {
                    if history_file.is_some() && !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }

                    let loop_condition = self.evaluate(&mut session, connection, &line).await;
                    if let Some(helper) = editor.helper_mut() {
                        helper.set_aliases(&session.aliases);
                    }
                    loop_condition
                }
                Err(ReadlineError::Eof) => {
                    connection.close().await?;
                    LoopCondition::Exit(0)
                }
                Err(ReadlineError::Interrupted) => {
                    eprintln!("{}", "Program interrupted".red());
                    error!("Program interrupted");
                    connection.close().await?;
                    LoopCondition::Exit(1)
                }
                Err(error) => {
                    eprintln!("{}: {error}", "Error".red());
                    error!("{error}");
                    LoopCondition::Exit(1)
                }
            };

            if let LoopCondition::Exit(exit_code) = loop_condition {
                if let Some(history_file) = history_file {
                    editor.save_history(history_file)?;
                }
                info!("Exiting with code {exit_code}");
                return Ok(exit_code);
            }
        }
    }

    /// Evaluate a line; failures are reported and end the loop only when `bail_on_error` is set.
    async fn evaluate(
        &self,
        session: &mut Session,
        connection: &mut dyn Connection,
        line: &str,
    ) -> LoopCondition {
        let mut output = Output::new(Box::new(StdoutWriter));
        let mut executor = Executor::new(
            &self.configuration,
            &self.command_manager,
            &self.formatter_manager,
            session,
            connection,
            &mut output,
        );

        executor.execute(line).await.unwrap_or_else(|error| {
            eprintln!("{}: {error}", "Error".red());
            error!("{error}");
            if self.configuration.bail_on_error {
                LoopCondition::Exit(1)
            } else {
                LoopCondition::Continue
            }
        })
    }
}

/// Display the welcome message.
fn welcome_message(configuration: &Configuration, session: &Session) {
    let version = full_version(configuration);

    eprintln!("{version}");
    eprintln!("Connected to {}", session.database.bold());
    eprintln!(
        "Type '{}' for help, '{}' to exit.",
        ".help".bold(),
        ".quit".bold()
    );
}
