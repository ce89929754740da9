use std::{fmt, sync::Arc};

use tracing::{debug, trace};

use super::{ConnectionSettings, Credentials};
use crate::{
    config::{ConfigStore, OverrideMap, SettingKey},
    constants::DEFAULT_PROFILE,
};

/// Merges runtime overrides and persisted settings into concrete values.
///
/// Nothing is cached: every call reads both sources again. A key present in
/// the override map always wins, even when its value is empty.
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn ConfigStore>,
    overrides: OverrideMap,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn ConfigStore>, overrides: OverrideMap) -> Self {
        Self { store, overrides }
    }

    /// Resolve credentials for `profile` (`"default"` when `None`).
    ///
    /// Unset fields come back as empty strings.
    pub fn resolve(&self, profile: Option<&str>) -> Credentials {
        let profile = profile.unwrap_or(DEFAULT_PROFILE);
        debug!("Resolving credentials for profile: {}", profile);

        Credentials::new(
            self.lookup(SettingKey::AwsId),
            self.lookup(SettingKey::AwsSecret),
        )
    }

    pub fn region(&self) -> String {
        self.lookup(SettingKey::AwsRegion)
    }

    pub fn endpoint(&self) -> String {
        self.lookup(SettingKey::AwsEndpoint)
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            region: self.region(),
            endpoint: self.endpoint(),
        }
    }

    fn lookup(&self, key: SettingKey) -> String {
        let key = key.key();

        if let Some(value) = self.overrides.get(key) {
            trace!("{} resolved from overrides", key);
            return value;
        }

        match self.store.get(key) {
            Some(value) => {
                trace!("{} resolved from settings", key);
                value
            }
            None => {
                trace!("{} is not set", key);
                String::new()
            }
        }
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("overrides", &self.overrides)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AWS_ENDPOINT_KEY, AWS_ID_KEY, AWS_REGION_KEY, AWS_SECRET_KEY};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn store(entries: &[(&str, &str)]) -> Arc<dyn ConfigStore> {
        Arc::new(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn full_store() -> Arc<dyn ConfigStore> {
        store(&[
            (AWS_ID_KEY, "AKIASTORED"),
            (AWS_SECRET_KEY, "storedsecret"),
            (AWS_REGION_KEY, "eu-west-1"),
            (AWS_ENDPOINT_KEY, "stored.iot.eu-west-1.amazonaws.com"),
        ])
    }

    #[test]
    fn test_resolve_reads_settings_without_overrides() {
        let resolver = CredentialResolver::new(full_store(), OverrideMap::new());

        let creds = resolver.resolve(None);

        assert_eq!(creds.access_key_id(), "AKIASTORED");
        assert_eq!(creds.secret_access_key(), "storedsecret");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = OverrideMap::new();
        overrides.set(AWS_ID_KEY, "AKIAOVERRIDE");
        overrides.set(AWS_REGION_KEY, "ap-northeast-1");
        let resolver = CredentialResolver::new(full_store(), overrides);

        let creds = resolver.resolve(Some("default"));

        assert_eq!(creds.access_key_id(), "AKIAOVERRIDE");
        assert_eq!(creds.secret_access_key(), "storedsecret");
        assert_eq!(
            resolver.connection_settings(),
            ConnectionSettings {
                region: "ap-northeast-1".to_string(),
                endpoint: "stored.iot.eu-west-1.amazonaws.com".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_override_still_wins() {
        let overrides = OverrideMap::new();
        overrides.set(AWS_SECRET_KEY, "");
        let resolver = CredentialResolver::new(full_store(), overrides);

        assert_eq!(resolver.resolve(None).secret_access_key(), "");
    }

    #[test]
    fn test_unset_fields_resolve_empty() {
        let resolver = CredentialResolver::new(store(&[]), OverrideMap::new());

        let creds = resolver.resolve(Some("missing"));

        assert_eq!(creds.access_key_id(), "");
        assert_eq!(creds.secret_access_key(), "");
        assert_eq!(resolver.connection_settings(), ConnectionSettings::default());
    }

    #[test]
    fn test_any_profile_name_resolves_same_keys() {
        let resolver = CredentialResolver::new(full_store(), OverrideMap::new());

        assert_eq!(resolver.resolve(Some("production")), resolver.resolve(None));
    }

    #[test]
    fn test_session_token_is_never_set() {
        let overrides = OverrideMap::new();
        overrides.set("aws_connector.aws_session_token", "token");
        let resolver = CredentialResolver::new(full_store(), overrides);

        assert_eq!(resolver.resolve(None).session_token(), None);
    }

    #[test]
    fn test_resolution_is_not_cached() {
        let overrides = OverrideMap::new();
        let resolver = CredentialResolver::new(full_store(), overrides.clone());

        assert_eq!(resolver.endpoint(), "stored.iot.eu-west-1.amazonaws.com");

        overrides.set(AWS_ENDPOINT_KEY, "override.iot.eu-west-1.amazonaws.com");
        assert_eq!(resolver.endpoint(), "override.iot.eu-west-1.amazonaws.com");

        overrides.remove(AWS_ENDPOINT_KEY);
        assert_eq!(resolver.endpoint(), "stored.iot.eu-west-1.amazonaws.com");
    }
}
