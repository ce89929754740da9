use std::fmt;

use crate::constants::CREDENTIALS_PROVIDER_NAME;

pub mod provider;
pub mod resolver;
pub mod validator;

/// Static AWS access credentials.
///
/// Session credentials are not supported: [`Credentials::session_token`]
/// always returns `None`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        None
    }

    /// Whether both the key id and the secret are non-empty
    pub fn is_complete(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }

    /// Convert into the credentials type consumed by AWS SDK clients
    pub fn into_sdk(self) -> aws_credential_types::Credentials {
        aws_credential_types::Credentials::new(
            self.access_key_id,
            self.secret_access_key,
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .finish()
    }
}

/// Region and IoT endpoint the connector talks to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub region: String,
    pub endpoint: String,
}

// Re-export commonly used types (functions should be accessed via module path)
pub use provider::{ConnectorCredentialsProvider, CredentialFactory};
pub use resolver::CredentialResolver;
pub use validator::{
    EndpointDescriber, IotEndpointDescriber, RemoteValidator, Translate, ValidationError,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_always_absent() {
        let creds = Credentials::new("AKIAEXAMPLE", "secret");
        assert_eq!(creds.session_token(), None);
    }

    #[test]
    fn test_is_complete() {
        assert!(Credentials::new("AKIAEXAMPLE", "secret").is_complete());
        assert!(!Credentials::new("", "secret").is_complete());
        assert!(!Credentials::new("AKIAEXAMPLE", "").is_complete());
    }

    #[test]
    fn test_into_sdk() {
        let sdk = Credentials::new("AKIAEXAMPLE", "secret").into_sdk();

        assert_eq!(sdk.access_key_id(), "AKIAEXAMPLE");
        assert_eq!(sdk.secret_access_key(), "secret");
        assert_eq!(sdk.session_token(), None);
        assert_eq!(sdk.expiry(), None);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", Credentials::new("AKIAEXAMPLE", "topsecret"));
        assert!(rendered.contains("AKIAEXAMPLE"));
        assert!(!rendered.contains("topsecret"));
    }
}
