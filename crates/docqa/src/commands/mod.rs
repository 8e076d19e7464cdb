//! CLI command handlers.

pub mod extract;
pub mod start;
pub mod summarize;

use docqa_config::DocqaConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Configuration merged from the discovered files.
    pub config: DocqaConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}
