use anyhow::Result;
use clap::Args;

use super::CommandContext;
use crate::aws::CredentialFactory;

#[derive(Debug, Clone, Args)]
pub struct ShowCommand {}

impl ShowCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let factory = CredentialFactory::new(ctx.resolver.clone());
        let credentials = factory.build(Some(&ctx.profile)).await;
        let connection = ctx.resolver.connection_settings();

        println!("Profile:           {}", ctx.profile);
        println!("Settings file:     {}", ctx.config_path.display());
        println!("Region:            {}", or_unset(&connection.region));
        println!("Endpoint:          {}", or_unset(&connection.endpoint));
        println!("Access key id:     {}", or_unset(credentials.access_key_id()));
        println!(
            "Secret access key: {}",
            or_unset(&mask_secret(credentials.secret_access_key()))
        );
        println!(
            "Session token:     {}",
            credentials.session_token().unwrap_or("none")
        );

        Ok(())
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

/// Hide all but the last four characters of a secret
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => String::new(),
        n if n <= 4 => "****".to_string(),
        n => format!("****{}", chars[n - 4..].iter().collect::<String>()),
    }
}
