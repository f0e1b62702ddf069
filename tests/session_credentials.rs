use std::time::{Duration, UNIX_EPOCH};

use aws_credential_types::provider::ProvideCredentials;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cos_transfer::SessionCredentialProvider;

#[tokio::test]
async fn fetches_temporary_credentials_per_resolution() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tmpSecretId": "tmp-id",
            "tmpSecretKey": "tmp-key",
            "sessionToken": "token-1",
            "expiredTime": 1_900_000_000u64,
        })))
        .expect(2)
        .mount(&server)
        .await;

    let provider = SessionCredentialProvider::new(format!("{}/sts", server.uri()));

    let credentials = provider.provide_credentials().await.unwrap();
    assert_eq!(credentials.access_key_id(), "tmp-id");
    assert_eq!(credentials.secret_access_key(), "tmp-key");
    assert_eq!(credentials.session_token(), Some("token-1"));
    assert_eq!(
        credentials.expiry(),
        Some(UNIX_EPOCH + Duration::from_secs(1_900_000_000))
    );

    // Rotation means a fresh fetch every time, not a cached session.
    provider.provide_credentials().await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn endpoint_failure_is_a_credentials_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = SessionCredentialProvider::new(format!("{}/sts", server.uri()));
    assert!(provider.provide_credentials().await.is_err());
}
