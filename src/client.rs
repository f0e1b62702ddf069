//! COS service configuration and client construction

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use aws_config::Region;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{self, future, ProvideCredentials};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};

/// Session TTL attached to plain long-lived secrets, in seconds.
pub const PLAIN_CREDENTIAL_TTL_SECS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosConfig {
    /// COS region, e.g. `ap-guangzhou`.
    pub region: String,
    /// Full endpoint override. Defaults to `https://cos.<region>.myqcloud.com`.
    pub endpoint: Option<String>,
}

impl CosConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://cos.{}.myqcloud.com", self.region),
        }
    }
}

/// Long-lived account secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlainCredentials {
    pub secret_id: String,
    pub secret_key: String,
}

/// Temporary credentials as issued by a backing STS endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    pub tmp_secret_id: String,
    pub tmp_secret_key: String,
    pub session_token: String,
    /// Unix timestamp (seconds) after which the credentials expire.
    pub expired_time: i64,
}

/// Where the store client obtains its credentials from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Plain secret, issued as sessions of [`PLAIN_CREDENTIAL_TTL_SECS`].
    Plain(PlainCredentials),
    /// HTTP(S) endpoint returning [`SessionCredentials`] as JSON, fetched on
    /// every credential resolution.
    SessionUrl(String),
}

#[derive(Debug)]
struct PlainCredentialProvider {
    credentials: PlainCredentials,
}

impl ProvideCredentials for PlainCredentialProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        let expiry = SystemTime::now() + Duration::from_secs(PLAIN_CREDENTIAL_TTL_SECS);
        future::ProvideCredentials::ready(Ok(Credentials::new(
            self.credentials.secret_id.clone(),
            self.credentials.secret_key.clone(),
            None,
            Some(expiry),
            "cos-plain-secret",
        )))
    }
}

/// Fetches temporary credentials from a caller-operated endpoint on every
/// resolution, so rotation happens without rebuilding the client.
#[derive(Debug)]
pub struct SessionCredentialProvider {
    url: String,
    http: reqwest::Client,
}

impl SessionCredentialProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn fetch(&self) -> provider::Result {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(CredentialsError::provider_error)?
            .error_for_status()
            .map_err(CredentialsError::provider_error)?;

        let session: SessionCredentials = response
            .json()
            .await
            .map_err(CredentialsError::provider_error)?;

        let expiry = UNIX_EPOCH + Duration::from_secs(session.expired_time.max(0) as u64);
        Ok(Credentials::new(
            session.tmp_secret_id,
            session.tmp_secret_key,
            Some(session.session_token),
            Some(expiry),
            "cos-session-endpoint",
        ))
    }
}

impl ProvideCredentials for SessionCredentialProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.fetch())
    }
}

/// Create an S3 client configured for Tencent COS.
pub fn create_cos_client(config: &CosConfig, credentials: CredentialSource) -> Client {
    let builder = S3ConfigBuilder::new()
        .region(Region::new(config.region.clone()))
        .endpoint_url(config.endpoint_url())
        .force_path_style(true);

    let builder = match credentials {
        CredentialSource::Plain(plain) => {
            builder.credentials_provider(PlainCredentialProvider { credentials: plain })
        }
        CredentialSource::SessionUrl(url) => {
            builder.credentials_provider(SessionCredentialProvider::new(url))
        }
    };

    Client::from_conf(builder.build())
}
