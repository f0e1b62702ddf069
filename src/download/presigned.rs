//! Presigned GET URLs for download streaming

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use crate::error::{classify_sdk_error, TransferError, TransferResult};

/// Presigned GET URL for an object, valid for `expires_in_secs`.
pub(crate) async fn presigned_get_url(
    client: &Client,
    bucket: &str,
    key: &str,
    expires_in_secs: u64,
) -> TransferResult<String> {
    let presigning_config = PresigningConfig::builder()
        .expires_in(Duration::from_secs(expires_in_secs))
        .build()
        .map_err(|e| TransferError::Client(format!("invalid presigning config: {e}")))?;

    let presigned_request = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .presigned(presigning_config)
        .await
        .map_err(classify_sdk_error)?;

    Ok(presigned_request.uri().to_string())
}
