use std::future::{self, Ready};

use aws_credential_types::provider::{self as sdk_provider, ProvideCredentials};
use tracing::debug;

use super::{Credentials, CredentialResolver};
use crate::constants::DEFAULT_PROFILE;

/// Produces credentials behind an awaitable interface.
///
/// Resolution itself is synchronous; the future returned by
/// [`CredentialFactory::build`] is already complete.
#[derive(Debug, Clone)]
pub struct CredentialFactory {
    resolver: CredentialResolver,
}

impl CredentialFactory {
    pub fn new(resolver: CredentialResolver) -> Self {
        Self { resolver }
    }

    /// Resolve `profile` now and hand the result back as a ready future.
    /// Never fails: unset fields become empty strings.
    pub fn build(&self, profile: Option<&str>) -> Ready<Credentials> {
        future::ready(self.resolver.resolve(profile))
    }

    /// Credentials provider for AWS SDK clients and provider chains
    pub fn provider(&self, profile: Option<&str>) -> ConnectorCredentialsProvider {
        ConnectorCredentialsProvider {
            resolver: self.resolver.clone(),
            profile: profile.unwrap_or(DEFAULT_PROFILE).to_string(),
        }
    }
}

/// [`ProvideCredentials`] implementation that re-resolves on every request
#[derive(Debug, Clone)]
pub struct ConnectorCredentialsProvider {
    resolver: CredentialResolver,
    profile: String,
}

impl ConnectorCredentialsProvider {
    pub fn profile(&self) -> &str {
        &self.profile
    }
}

impl ProvideCredentials for ConnectorCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> sdk_provider::future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        debug!("Providing credentials for profile: {}", self.profile);
        let credentials = self.resolver.resolve(Some(&self.profile));
        sdk_provider::future::ProvideCredentials::ready(Ok(credentials.into_sdk()))
    }
}
