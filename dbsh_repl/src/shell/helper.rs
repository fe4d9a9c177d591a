use crate::commands::CommandManager;
use dbsh_driver::{Aliases, DATABASE_ALIAS};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

/// Line editor helper: history hints and completion of dot-commands and aliases.
pub(crate) struct ReplHelper {
    commands: Vec<Pair>,
    aliases: Vec<String>,
}

impl ReplHelper {
    pub(crate) fn new(command_manager: &CommandManager) -> Self {
        let commands = command_manager
            .iter()
            .map(|command| {
                let replacement = format!(".{}", command.name());
                let display = if command.args().is_empty() {
                    replacement.clone()
                } else {
                    format!("{replacement} {}", command.args())
                };
                Pair {
                    display,
                    replacement,
                }
            })
            .collect();

        Self {
            commands,
            aliases: vec![DATABASE_ALIAS.to_string()],
        }
    }

    /// Replace the alias candidates
    pub(crate) fn set_aliases(&mut self, aliases: &Aliases) {
        self.aliases = std::iter::once(DATABASE_ALIAS.to_string())
            .chain(aliases.iter().map(|(alias, _)| alias.to_string()))
            .collect();
    }
}

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || matches!(c, '(' | '{' | '[' | ','))
            .map_or(0, |index| index + 1);
        let word = &line[start..pos];

        let candidates = if start == 0 && word.starts_with('.') {
            self.commands
                .iter()
                .filter(|pair| pair.replacement.starts_with(word))
                .map(|pair| Pair {
                    display: pair.display.clone(),
                    replacement: pair.replacement.clone(),
                })
                .collect()
        } else if word.is_empty() {
            Vec::new()
        } else {
            self.aliases
                .iter()
                .filter(|alias| alias.starts_with(word))
                .map(|alias| Pair {
                    display: alias.clone(),
                    replacement: alias.clone(),
                })
                .collect()
        };

        Ok((start, candidates))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<Self::Hint> {
        let hinter = HistoryHinter {};
        hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ReplHelper {}

impl Validator for ReplHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}
