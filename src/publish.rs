//! Two-pass publication workflow.
//!
//! The QR must encode the certificate's own retrieval URL, which is only
//! known after the first upload, so the artifact is rendered, published,
//! re-rendered with the self-referential QR, and published again under a
//! fresh identifier. Both passes are load-bearing; the URL cannot be
//! predicted before the draft upload.
//!
//! Local temp files are scoped to this invocation: `NamedTempFile` deletes
//! them on drop, on success and on every error path alike.

use std::io::Write;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};
use uuid::Uuid;

use crate::error::Result;
use crate::qr::QrArtifact;
use crate::record::CertificateRecord;
use crate::render::{render_certificate, RenderAssets};
use crate::store::RemoteStore;

/// Final artifact of a publication run.
#[derive(Debug, Clone)]
pub struct Published {
    /// Bytes of the final (QR-bearing) certificate.
    pub bytes: Vec<u8>,
    /// Public URL of the final certificate.
    pub url: String,
    /// URL the embedded QR resolves to (the draft's hosted copy).
    pub qr_url: String,
    /// Local filename suggestion, derived from the final object id.
    pub suggested_filename: String,
}

/// Render, upload, re-render with QR, re-upload. See module docs.
pub fn publish(
    record: &CertificateRecord,
    store: &dyn RemoteStore,
    assets: &RenderAssets,
) -> Result<Published> {
    publish_in(record, store, assets, &std::env::temp_dir())
}

/// Like [`publish`] but with an explicit scratch directory, so tests can
/// observe that no temp artifact survives the invocation.
pub fn publish_in(
    record: &CertificateRecord,
    store: &dyn RemoteStore,
    assets: &RenderAssets,
    work_dir: &Path,
) -> Result<Published> {
    // Pass 1: draft without QR.
    let draft_bytes = render_certificate(record, None, assets)?;
    let draft_file = write_temp(work_dir, &draft_bytes)?;
    let draft_id = fresh_id();
    let draft = store.upload(draft_file.path(), &draft_id)?;
    log::info!("draft certificate published at {}", draft.secure_url);

    let qr = QrArtifact::encode(&draft.secure_url)?;

    // Pass 2: final with the self-referential QR, under a new identifier.
    let final_bytes = render_certificate(record, Some(&qr), assets)?;
    let final_file = write_temp(work_dir, &final_bytes)?;
    let final_id = fresh_id();
    let uploaded = store.upload(final_file.path(), &final_id)?;
    log::info!("final certificate published at {}", uploaded.secure_url);

    Ok(Published {
        bytes: final_bytes,
        url: uploaded.secure_url,
        qr_url: qr.payload().to_string(),
        suggested_filename: format!("certificate_{}.pdf", &final_id[..8]),
    })
}

/// Fresh collision-free object identifier, one per upload.
fn fresh_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn write_temp(dir: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let mut file = Builder::new()
        .prefix("battcert_")
        .suffix(".pdf")
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}
