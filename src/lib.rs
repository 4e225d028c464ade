pub mod ai;
pub mod config;
pub mod error;
pub mod forge;
pub mod git;
pub mod logging;
pub mod process;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use ai::{GeneratedSummary, SummaryClient};
pub use config::Config;
pub use error::{OpError, Outcome};
pub use forge::{DiffSource, ForgeClient};
pub use git::{GitClient, RepositoryContext};
pub use process::{CommandResult, ProcessRunner, SystemRunner};
