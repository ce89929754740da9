use anyhow::{Result, bail};
use clap::Args;
use tracing::info;

use super::CommandContext;
use crate::aws::{IotEndpointDescriber, RemoteValidator};

#[derive(Debug, Clone, Args)]
pub struct ValidateCommand {
    #[arg(
        short = 'k',
        long,
        help = "Access key id to validate instead of the stored one"
    )]
    pub access_key_id: Option<String>,

    #[arg(
        short = 's',
        long,
        help = "Secret access key to validate instead of the stored one"
    )]
    pub secret_access_key: Option<String>,
}

impl ValidateCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let access_key_id = self.access_key_id.unwrap_or_default();
        let secret_access_key = self.secret_access_key.unwrap_or_default();

        if access_key_id.is_empty() != secret_access_key.is_empty() {
            info!("Only one key given, validating stored credentials instead");
        }

        let validator = RemoteValidator::new(ctx.resolver.clone(), IotEndpointDescriber::new());
        let message = validator
            .validate(&access_key_id, &secret_access_key)
            .await;

        if !message.is_empty() {
            bail!("{message}");
        }

        println!("Credentials are valid.");
        Ok(())
    }
}
