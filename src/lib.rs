//! # battcert – battery-health certificate renderer & publisher
//!
//! Deterministic pipeline from a validated input record to a single-page
//! A4 PDF certificate, plus a two-pass publication workflow:
//!
//! 1. **Layout** – record → fixed-position primitive list ([`layout`])
//! 2. **Render** – primitives → PDF bytes via printpdf ([`render`])
//! 3. **Publish** – draft upload → QR of the hosted URL → final render →
//!    final upload ([`publish`], [`qr`], [`store`])
//!
//! The renderer is a pure function of the record and its optional image
//! inputs; the workflow owns identifiers, temp-file lifecycle and the
//! remote-store contract.

pub mod catalog;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod publish;
pub mod qr;
pub mod record;
pub mod render;
pub mod store;

// Re-exports for convenience
pub use error::{CertError, Result};
pub use publish::{publish, Published};
pub use record::{CertificateRecord, HealthStatus};
pub use render::{render_certificate, RenderAssets};
