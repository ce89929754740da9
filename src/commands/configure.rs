use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::info;

use super::CommandContext;
use crate::{
    aws::{CredentialResolver, EndpointDescriber, IotEndpointDescriber, RemoteValidator},
    config::{self, ConfigStore, IniConfigStore, OverrideMap, Settings},
};

#[derive(Debug, Clone, Args)]
pub struct ConfigureCommand {
    #[arg(long, help = "Save without checking the keys against AWS IoT")]
    pub skip_validation: bool,
}

impl ConfigureCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        println!("Configuring aws-connector in {}", ctx.config_path.display());

        let existing = IniConfigStore::load(&ctx.config_path)?;
        let existing = Settings::from_store(&existing);
        if existing != Settings::default() {
            println!("Press Enter to keep current values, or type new values.");
        }
        println!();

        let settings = config::prompt_settings(existing)?;

        if self.skip_validation {
            info!("Skipping credential validation");
        } else {
            validate_settings(&settings).await?;
        }

        config::save(&ctx.config_path, &settings)
            .await
            .context("Failed to save settings")?;

        println!("\nConfiguration saved successfully.");
        Ok(())
    }
}

/// Check the entered keys in the entered region
async fn validate_settings(settings: &Settings) -> Result<()> {
    let message = entered_settings_validator(settings, IotEndpointDescriber::new())
        .validate(&settings.aws_id, &settings.aws_secret)
        .await;

    if !message.is_empty() {
        bail!("{message} Settings were not saved (use --skip-validation to save anyway).");
    }

    Ok(())
}

/// Validator that sees only the entered settings; active overrides are ignored
/// since they are not what gets saved
fn entered_settings_validator<D: EndpointDescriber>(
    settings: &Settings,
    describer: D,
) -> RemoteValidator<D> {
    let store: Arc<dyn ConfigStore> = Arc::new(settings.clone().into_store());
    RemoteValidator::new(CredentialResolver::new(store, OverrideMap::new()), describer)
}
