use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use crate::{
    aws::CredentialResolver,
    commands::{CommandContext, CompletionsCommand, ConfigureCommand, ShowCommand, ValidateCommand},
    config::{IniConfigStore, OverrideMap, SettingKey},
    constants::{self, DEFAULT_PROFILE},
};

#[derive(Debug, Clone, Parser)]
#[command(name = "aws-connector", version, about = "Resolve and validate AWS IoT connector credentials", long_about = None, arg_required_else_help = false)]
pub struct Cli {
    #[arg(
        short = 'p',
        long,
        global = true,
        default_value = DEFAULT_PROFILE,
        help = "Credential profile name"
    )]
    pub profile: String,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long,
        global = true,
        value_name = "PATH",
        help = "Settings file (defaults to ~/.config/aws-connector/settings.ini)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long = "set",
        global = true,
        value_name = "KEY=VALUE",
        value_parser = parse_override,
        help = "Override a setting for this run, e.g. aws_connector.aws_region=eu-west-1"
    )]
    pub overrides: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Show the resolved credentials and connection settings")]
    Show(ShowCommand),
    #[command(about = "Check credentials against AWS IoT")]
    Validate(ValidateCommand),
    #[command(about = "Configure the stored AWS settings")]
    Configure(ConfigureCommand),
    #[command(about = "Generate shell completion scripts for aws-connector")]
    Completions(CompletionsCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let command = self.command.unwrap_or(Commands::Show(ShowCommand {}));

        if let Commands::Completions(cmd) = command {
            cmd.execute();
            return Ok(());
        }

        let config_path = match self.config {
            Some(path) => path,
            None => constants::get_config_path().context("Failed to determine settings path")?,
        };

        let overrides = OverrideMap::from_env();
        for (key, value) in self.overrides {
            overrides.set(key, value);
        }

        let store = IniConfigStore::load(&config_path)?;
        let ctx = CommandContext {
            profile: self.profile,
            config_path,
            resolver: CredentialResolver::new(Arc::new(store), overrides),
        };

        match command {
            Commands::Show(cmd) => cmd.execute(&ctx).await,
            Commands::Validate(cmd) => cmd.execute(&ctx).await,
            Commands::Configure(cmd) => cmd.execute(&ctx).await,
            Commands::Completions(_) => Ok(()),
        }
    }
}

/// Parse `key=value` where key is one of the known settings keys
fn parse_override(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;

    let key = key.trim();
    if SettingKey::from_key(key).is_none() {
        let known = SettingKey::ALL
            .iter()
            .map(|k| k.key())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(format!("unknown setting '{key}', expected one of: {known}"));
    }

    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, error::ErrorKind};

    #[test]
    fn test_default_command_is_show() {
        let cli = Cli::try_parse_from(["aws-connector"]).unwrap();
        assert!(cli.command.is_none());

        match cli.command.unwrap_or(Commands::Show(ShowCommand {})) {
            Commands::Show(_) => {}
            _ => panic!("Expected Show command as default"),
        }
    }

    #[test]
    fn test_profile_default_value() {
        let cli = Cli::try_parse_from(["aws-connector", "show"]).unwrap();
        assert_eq!(cli.profile, "default");
    }

    #[test]
    fn test_profile_custom_value() {
        let cli = Cli::try_parse_from(["aws-connector", "--profile", "production", "show"]).unwrap();
        assert_eq!(cli.profile, "production");
    }

    #[test]
    fn test_profile_short_flag() {
        let cli = Cli::try_parse_from(["aws-connector", "-p", "dev", "validate"]).unwrap();
        assert_eq!(cli.profile, "dev");
    }

    #[test]
    fn test_config_path_flag() {
        let cli =
            Cli::try_parse_from(["aws-connector", "-c", "/tmp/settings.ini", "show"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/settings.ini")));
    }

    #[test]
    fn test_validate_with_explicit_keys() {
        let cli = Cli::try_parse_from([
            "aws-connector",
            "validate",
            "--access-key-id",
            "AKIA_VALID",
            "-s",
            "validsecret",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Validate(cmd)) => {
                assert_eq!(cmd.access_key_id, Some("AKIA_VALID".to_string()));
                assert_eq!(cmd.secret_access_key, Some("validsecret".to_string()));
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_validate_without_keys() {
        let cli = Cli::try_parse_from(["aws-connector", "validate"]).unwrap();

        match cli.command {
            Some(Commands::Validate(cmd)) => {
                assert_eq!(cmd.access_key_id, None);
                assert_eq!(cmd.secret_access_key, None);
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_configure_command_parsing() {
        let cli = Cli::try_parse_from(["aws-connector", "configure", "--skip-validation"]).unwrap();
        match cli.command {
            Some(Commands::Configure(cmd)) => assert!(cmd.skip_validation),
            _ => panic!("Expected Configure command"),
        }
    }

    #[test]
    fn test_completions_command_parsing() {
        let cli = Cli::try_parse_from(["aws-connector", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Completions(_))));
    }

    #[test]
    fn test_set_overrides_repeatable() {
        let cli = Cli::try_parse_from([
            "aws-connector",
            "--set",
            "aws_connector.aws_region=eu-west-1",
            "--set",
            "aws_connector.aws_endpoint=host=with=equals",
            "show",
        ])
        .unwrap();

        assert_eq!(
            cli.overrides,
            vec![
                (
                    "aws_connector.aws_region".to_string(),
                    "eu-west-1".to_string()
                ),
                (
                    "aws_connector.aws_endpoint".to_string(),
                    "host=with=equals".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_set_override_allows_empty_value() {
        assert_eq!(
            parse_override("aws_connector.aws_secret="),
            Ok(("aws_connector.aws_secret".to_string(), String::new()))
        );
    }

    #[test]
    fn test_set_override_rejects_unknown_key() {
        let result = Cli::try_parse_from(["aws-connector", "--set", "aws_region=eu-west-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_override_requires_equals() {
        assert!(parse_override("aws_connector.aws_region").is_err());
    }

    #[test]
    fn test_command_structure_validation() {
        let cmd = Cli::command();
        cmd.debug_assert();
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["aws-connector", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_help_flag_works() {
        let result = Cli::try_parse_from(["aws-connector", "--help"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayHelp);
        }
    }

    #[test]
    fn test_version_flag_works() {
        let result = Cli::try_parse_from(["aws-connector", "--version"]);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn test_verbose_flag_multiple() {
        let cli = Cli::try_parse_from(["aws-connector", "-vvv", "show"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_verbose_default_zero() {
        let cli = Cli::try_parse_from(["aws-connector", "show"]).unwrap();
        assert_eq!(cli.verbose, 0);
    }
}
