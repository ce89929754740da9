use std::{error::Error as StdError, sync::Arc};

use async_trait::async_trait;
use aws_sdk_iot::{
    Client as IotClient,
    config::{BehaviorVersion, Region, http::HttpResponse, retry::RetryConfig},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{Credentials, CredentialResolver};
use crate::constants::{
    DEFAULT_AWS_REGION, DEFAULT_PROFILE, INVALID_CREDENTIALS_MESSAGE, IOT_API_VERSION,
};

/// Error codes AWS returns when the signature or the keys are not accepted
const AUTH_ERROR_CODES: &[&str] = &[
    "UnrecognizedClientException",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "InvalidSignatureException",
    "UnauthorizedException",
    "MissingAuthenticationTokenException",
    "ExpiredTokenException",
];

/// Why a validation call did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The service refused the credentials
    #[error("AWS IoT rejected the credentials ({status} {code})")]
    Rejected { status: u16, code: String },
    /// The service answered with a non-auth error, e.g. throttling or an outage
    #[error("AWS IoT failed the request ({status} {code})")]
    Unavailable { status: u16, code: String },
    /// No response: network failure or timeout
    #[error("AWS IoT could not be reached: {0}")]
    Unreachable(String),
}

impl ValidationError {
    fn from_sdk<E>(err: SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    {
        match &err {
            SdkError::ServiceError(service) => {
                let status = service.raw().status().as_u16();
                let code = service.err().code().unwrap_or("Unknown").to_string();
                match is_auth_failure(status, &code) {
                    true => ValidationError::Rejected { status, code },
                    false => ValidationError::Unavailable { status, code },
                }
            }
            _ => ValidationError::Unreachable(DisplayErrorContext(&err).to_string()),
        }
    }
}

fn is_auth_failure(status: u16, code: &str) -> bool {
    matches!(status, 401 | 403)
        || code.starts_with("AccessDenied")
        || AUTH_ERROR_CODES.contains(&code)
}

/// One authenticated round-trip against the remote service.
///
/// Implementations build their own client from the given credentials and
/// region, so each call is independent.
#[async_trait]
pub trait EndpointDescriber: Send + Sync {
    /// Returns the endpoint address reported by the service
    async fn describe_endpoint(
        &self,
        credentials: &Credentials,
        region: &str,
    ) -> Result<String, ValidationError>;
}

#[async_trait]
impl<T: EndpointDescriber + ?Sized> EndpointDescriber for Arc<T> {
    async fn describe_endpoint(
        &self,
        credentials: &Credentials,
        region: &str,
    ) -> Result<String, ValidationError> {
        (**self).describe_endpoint(credentials, region).await
    }
}

/// Calls AWS IoT `DescribeEndpoint` with retries disabled
#[derive(Debug, Clone, Default)]
pub struct IotEndpointDescriber {
    endpoint_url: Option<String>,
}

impl IotEndpointDescriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send requests to `url` instead of the regional AWS endpoint
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    fn client(&self, credentials: &Credentials, region: &str) -> IotClient {
        let mut builder = aws_sdk_iot::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials.clone().into_sdk())
            .retry_config(RetryConfig::disabled());

        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }

        IotClient::from_conf(builder.build())
    }
}

#[async_trait]
impl EndpointDescriber for IotEndpointDescriber {
    async fn describe_endpoint(
        &self,
        credentials: &Credentials,
        region: &str,
    ) -> Result<String, ValidationError> {
        debug!(
            "Calling AWS IoT DescribeEndpoint (API {}) in {}",
            IOT_API_VERSION, region
        );

        let output = self
            .client(credentials, region)
            .describe_endpoint()
            .send()
            .await
            .map_err(ValidationError::from_sdk)?;

        Ok(output.endpoint_address().unwrap_or_default().to_string())
    }
}

/// Localises user-facing messages
pub trait Translate: Send + Sync {
    fn translate(&self, message: &str) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, message: &str) -> String {
        self(message)
    }
}

/// Confirms credentials are accepted by AWS IoT
pub struct RemoteValidator<D = IotEndpointDescriber> {
    resolver: CredentialResolver,
    describer: D,
    translator: Box<dyn Translate>,
}

impl<D: EndpointDescriber> RemoteValidator<D> {
    pub fn new(resolver: CredentialResolver, describer: D) -> Self {
        Self {
            resolver,
            describer,
            translator: Box::new(|message: &str| message.to_string()),
        }
    }

    pub fn with_translator(mut self, translator: impl Translate + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    /// Validate the given keys, or the resolved `default` profile when
    /// either key is empty.
    ///
    /// Returns an empty string on success and the translated
    /// invalid-credentials message on any failure.
    pub async fn validate(&self, access_key_id: &str, secret_access_key: &str) -> String {
        match self.check(access_key_id, secret_access_key).await {
            Ok(_) => String::new(),
            Err(ValidationError::Rejected { status, code }) => {
                warn!("Credentials rejected by AWS IoT: {} {}", status, code);
                self.translator.translate(INVALID_CREDENTIALS_MESSAGE)
            }
            Err(ValidationError::Unavailable { status, code }) => {
                warn!("AWS IoT failed during validation: {} {}", status, code);
                self.translator.translate(INVALID_CREDENTIALS_MESSAGE)
            }
            Err(ValidationError::Unreachable(reason)) => {
                warn!("AWS IoT unreachable during validation: {}", reason);
                self.translator.translate(INVALID_CREDENTIALS_MESSAGE)
            }
        }
    }

    /// Same selection rules as [`RemoteValidator::validate`], keeping the
    /// error kind. On success returns the endpoint address reported by IoT.
    pub async fn check(
        &self,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Result<String, ValidationError> {
        let credentials = match access_key_id.is_empty() || secret_access_key.is_empty() {
            true => {
                debug!("No explicit keys given, falling back to stored settings");
                self.resolver.resolve(Some(DEFAULT_PROFILE))
            }
            false => Credentials::new(access_key_id, secret_access_key),
        };

        let region = self.region();
        info!(
            "Validating access key {} in region {}",
            credentials.access_key_id(),
            region
        );

        let endpoint = self
            .describer
            .describe_endpoint(&credentials, &region)
            .await?;

        info!("Credentials accepted, IoT endpoint: {}", endpoint);
        Ok(endpoint)
    }

    fn region(&self) -> String {
        let region = self.resolver.region();
        match region.is_empty() {
            true => {
                info!(
                    "No region configured, using default {} for validation",
                    DEFAULT_AWS_REGION
                );
                DEFAULT_AWS_REGION.to_string()
            }
            false => region,
        }
    }
}
