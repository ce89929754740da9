use std::{env, path::PathBuf};

use dirs;

/// Namespace prefixing every settings key
pub const NAMESPACE: &str = "aws_connector";

/// INI section holding the connector settings
pub const SETTINGS_SECTION: &str = "aws_connector.settings";

pub const AWS_ID_KEY: &str = "aws_connector.aws_id";
pub const AWS_SECRET_KEY: &str = "aws_connector.aws_secret";
pub const AWS_REGION_KEY: &str = "aws_connector.aws_region";
pub const AWS_ENDPOINT_KEY: &str = "aws_connector.aws_endpoint";

/// Profile used when the caller does not name one
pub const DEFAULT_PROFILE: &str = "default";

/// AWS IoT control-plane API version the validator is pinned to
pub const IOT_API_VERSION: &str = "2015-05-28";

/// Region used for validation when neither overrides nor settings provide one
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Provider name attached to credentials handed to the AWS SDK
pub const CREDENTIALS_PROVIDER_NAME: &str = "AwsConnector";

/// Message returned by the validator when the remote call fails
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Your credentials are invalid.";

/// Default configuration directory name under `~/.config`
pub const CONFIG_DIR_NAME: &str = "aws-connector";

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "settings.ini";

/// Environment variable overriding the settings file location
pub const CONFIG_FILE_ENV: &str = "AWS_CONNECTOR_CONFIG_FILE";

/// Get the settings file path
/// Respects AWS_CONNECTOR_CONFIG_FILE environment variable if set
pub fn get_config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(CONFIG_DIR_NAME)
            .join(SETTINGS_FILE_NAME)
    })
}
