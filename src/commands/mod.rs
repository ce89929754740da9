use std::path::PathBuf;

use crate::aws::CredentialResolver;

pub mod completions;
pub mod configure;
pub mod show;
pub mod validate;

pub use completions::CompletionsCommand;
pub use configure::ConfigureCommand;
pub use show::ShowCommand;
pub use validate::ValidateCommand;

/// Everything a command needs, assembled once by the CLI
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub profile: String,
    pub config_path: PathBuf,
    pub resolver: CredentialResolver,
}
