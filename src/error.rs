//! Transfer error types

use std::path::PathBuf;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

pub type TransferResult<T> = Result<T, TransferError>;

/// Faults surfaced by transfer operations.
///
/// Mirrors the two exception kinds of the underlying store SDK: a client fault
/// never got a verdict from the store, a service fault is the store's own
/// rejection. Local filesystem problems are reported separately so callers can
/// tell a bad path from a bad request.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Local or network-level fault raised before the store produced a verdict.
    #[error("client error: {0}")]
    Client(String),

    /// The store rejected the request.
    #[error("service error: {message}")]
    Service {
        /// Machine-readable code reported by the store, e.g. `NoSuchUpload`.
        code: Option<String>,
        message: String,
    },

    /// A local file could not be read or stat'ed.
    #[error("local file error for {}: {source}", path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Split an SDK error into the service/client fault kinds. Anything that is
/// not an explicit store rejection (dispatch, timeout, construction, response
/// decoding) counts as a client fault, which therefore wins whenever both
/// could apply.
pub(crate) fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> TransferError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(context) => {
            let meta = context.err().meta();
            TransferError::Service {
                code: meta.code().map(str::to_string),
                message: meta
                    .message()
                    .unwrap_or("request rejected by the store")
                    .to_string(),
            }
        }
        other => TransferError::Client(format!("{}", DisplayErrorContext(&other))),
    }
}
