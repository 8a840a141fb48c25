//! Error taxonomy for certificate rendering and publication.
//!
//! Only two failure classes are recovered locally (bad percentage text and
//! missing optional assets) — those never reach this enum. Everything else
//! surfaces to the caller with its underlying cause attached.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CertError>;

#[derive(Error, Debug)]
pub enum CertError {
    /// A required store credential is absent; raised before any rendering
    /// or network work begins.
    #[error("missing store configuration: {0}")]
    MissingConfig(&'static str),

    #[error("QR encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("malformed certificate record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("upload transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered but refused the upload (auth, quota, bad request).
    #[error("upload rejected by store: {0}")]
    UploadRejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
