//! Remote object store: configuration, upload contract, and the Cloudinary
//! implementation.
//!
//! Credentials live in an explicit [`StoreConfig`] built once at process
//! start; nothing in the core reads the environment ambiently. The
//! [`RemoteStore`] trait is the seam the publication workflow depends on,
//! so tests can substitute a counting or failing fake.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{CertError, Result};

const CLOUD_NAME_VAR: &str = "CLOUDINARY_CLOUD_NAME";
const API_KEY_VAR: &str = "CLOUDINARY_API_KEY";
const API_SECRET_VAR: &str = "CLOUDINARY_API_SECRET";

/// Store credentials. All three fields are required; publication is
/// disabled when any is absent.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl StoreConfig {
    /// Read the three `CLOUDINARY_*` variables from the process
    /// environment. Fails fast on the first missing or empty one, before
    /// any rendering or network work happens.
    pub fn from_env() -> Result<Self> {
        fn require(name: &'static str) -> Result<String> {
            match std::env::var(name) {
                Ok(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(CertError::MissingConfig(name)),
            }
        }
        Ok(Self {
            cloud_name: require(CLOUD_NAME_VAR)?,
            api_key: require(API_KEY_VAR)?,
            api_secret: require(API_SECRET_VAR)?,
        })
    }
}

/// Outcome of one upload: the public URL plus the object identifier the
/// artifact lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub secure_url: String,
    pub public_id: String,
}

/// Upload seam used by the publication workflow. Implementations must
/// overwrite an existing object when given the same identifier twice.
pub trait RemoteStore {
    fn upload(&self, file: &Path, public_id: &str) -> Result<UploadResult>;
}

/// Synchronous Cloudinary upload client (signed upload API).
pub struct CloudinaryStore {
    config: StoreConfig,
    client: reqwest::blocking::Client,
}

/// Subset of Cloudinary's upload response we care about.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    public_id: Option<String>,
}

impl CloudinaryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn upload_endpoint(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }

    /// Delivery URL fallback when the API response omits `secure_url`.
    /// Must reproduce Cloudinary's real scheme exactly or QR scans break.
    fn delivery_url(&self, public_id: &str) -> String {
        format!(
            "https://res.cloudinary.com/{}/image/upload/{}.pdf",
            self.config.cloud_name, public_id
        )
    }

    /// SHA-256 request signature over the alphabetically-sorted signed
    /// parameters, with the API secret appended.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<_> = params.to_vec();
        sorted.sort_by_key(|(k, _)| *k);
        let joined = sorted
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let digest = Sha256::digest(format!("{joined}{}", self.config.api_secret).as_bytes());
        format!("{digest:x}")
    }
}

impl RemoteStore for CloudinaryStore {
    fn upload(&self, file: &Path, public_id: &str) -> Result<UploadResult> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
            .to_string();

        let signature = self.sign(&[
            ("overwrite", "true"),
            ("public_id", public_id),
            ("timestamp", &timestamp),
        ]);

        let form = reqwest::blocking::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp)
            .text("overwrite", "true")
            .text("signature", signature)
            .file("file", file)?;

        log::debug!("uploading '{}' as '{public_id}'", file.display());
        let response = self
            .client
            .post(self.upload_endpoint())
            .multipart(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CertError::UploadRejected(format!("{status}: {body}")));
        }

        let parsed: UploadResponse = response.json()?;
        let secure_url = parsed
            .secure_url
            .unwrap_or_else(|| self.delivery_url(public_id));
        Ok(UploadResult {
            secure_url,
            public_id: parsed.public_id.unwrap_or_else(|| public_id.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CloudinaryStore {
        CloudinaryStore::new(StoreConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        })
    }

    #[test]
    fn delivery_url_matches_cloudinary_scheme() {
        assert_eq!(
            store().delivery_url("cert123"),
            "https://res.cloudinary.com/demo/image/upload/cert123.pdf"
        );
    }

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let s = store();
        // Same parameters in any order sign identically.
        let a = s.sign(&[("timestamp", "1"), ("public_id", "x"), ("overwrite", "true")]);
        let b = s.sign(&[("overwrite", "true"), ("public_id", "x"), ("timestamp", "1")]);
        assert_eq!(a, b);
        let expected =
            format!("{:x}", Sha256::digest(b"overwrite=true&public_id=x&timestamp=1secret"));
        assert_eq!(a, expected);
    }

    #[test]
    fn missing_env_credentials_fail_fast() {
        std::env::remove_var(CLOUD_NAME_VAR);
        std::env::remove_var(API_KEY_VAR);
        std::env::remove_var(API_SECRET_VAR);
        match StoreConfig::from_env() {
            Err(CertError::MissingConfig(name)) => assert_eq!(name, CLOUD_NAME_VAR),
            other => panic!("expected MissingConfig, got {other:?}"),
        }
    }
}
