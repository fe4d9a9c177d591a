use crate::commands::{CommandOptions, LoopCondition, Result, ShellCommand};
use async_trait::async_trait;

/// Toggle between tables and structured output
#[derive(Debug, Default)]
pub(crate) struct Command;

#[async_trait]
impl ShellCommand for Command {
    fn name(&self) -> &'static str {
        "pretty"
    }

    fn description(&self) -> &'static str {
        "Toggle pretty (JSON) output of results"
    }

    async fn execute<'a>(&self, options: CommandOptions<'a>) -> Result<LoopCondition> {
        let state = if options.session.toggle_pretty() {
            "on"
        } else {
            "off"
        };
        writeln!(options.output, "Pretty output: {state}")?;
        Ok(LoopCondition::Continue)
    }
}
