//! Integration tests for the battcert pipeline.
//!
//! These tests validate:
//! - Threshold → label/colour mapping, including the boundary cases
//! - Gauge sweep proportionality
//! - Layout and output determinism
//! - The two-pass publication workflow against an injected store fake

use std::cell::RefCell;
use std::path::Path;

use battcert::layout::{certificate_layout, CertificateLayout, ImageSlot, Primitive};
use battcert::publish::publish_in;
use battcert::qr::QrArtifact;
use battcert::record::{CertificateRecord, HealthStatus};
use battcert::render::{render_certificate, RenderAssets};
use battcert::store::{RemoteStore, UploadResult};

// =====================================================================
// Helpers
// =====================================================================

fn record(percent: &str) -> CertificateRecord {
    CertificateRecord {
        test_date: "01/01/2024".into(),
        tested_by: "Acme EV Lab".into(),
        make: "Tesla".into(),
        model: "Model Y".into(),
        registration: "AB12 CDE".into(),
        first_registered: "28/10/2021".into(),
        vin: "5YJYGDEE9MF000000".into(),
        mileage: "32000".into(),
        battery_kwh: "75".into(),
        state_of_health: percent.into(),
    }
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn badge_fill(layout: &CertificateLayout) -> [f32; 3] {
    layout
        .primitives
        .iter()
        .find_map(|p| match p {
            Primitive::RoundedRect { fill, .. } => Some(*fill),
            _ => None,
        })
        .expect("badge rect present")
}

fn gauge_sweep(layout: &CertificateLayout) -> f32 {
    layout
        .primitives
        .iter()
        .find_map(|p| match p {
            Primitive::GaugeArc { sweep_deg, .. } => Some(*sweep_deg),
            _ => None,
        })
        .expect("gauge arc present")
}

fn has_text(layout: &CertificateLayout, needle: &str) -> bool {
    layout.primitives.iter().any(|p| matches!(
        p,
        Primitive::Text { content, .. } if content == needle
    ))
}

// =====================================================================
// Threshold / colour invariants
// =====================================================================

#[test]
fn threshold_boundaries() {
    let cases = [
        ("86", HealthStatus::Excellent),
        ("85", HealthStatus::Good),
        ("65", HealthStatus::Good),
        ("64", HealthStatus::Bad),
        ("100", HealthStatus::Excellent),
        ("0", HealthStatus::Bad),
    ];
    for (raw, expected) in cases {
        let r = record(raw);
        assert_eq!(r.status(), expected, "percent {raw}");
        let layout = certificate_layout(&r, false, false);
        assert_eq!(badge_fill(&layout), expected.color(), "percent {raw}");
        assert!(has_text(&layout, expected.label()), "percent {raw}");
    }
}

#[test]
fn percentage_parsing_at_the_record_boundary() {
    assert_eq!(record("90%").soh_percent(), 90);
    assert_eq!(record(" 47 ").soh_percent(), 47);
    assert_eq!(record("abc").soh_percent(), 0);
    assert_eq!(record("").soh_percent(), 0);
}

#[test]
fn gauge_fill_is_exactly_proportional() {
    for percent in [0u32, 1, 33, 50, 64, 65, 85, 86, 99, 100] {
        let layout = certificate_layout(&record(&percent.to_string()), false, false);
        let expected = 360.0 * percent as f32 / 100.0;
        assert!(
            (gauge_sweep(&layout) - expected).abs() < 1e-4,
            "percent {percent}"
        );
    }
}

// =====================================================================
// End-to-end scenario
// =====================================================================

#[test]
fn tesla_model_y_at_90_percent() {
    let r = record("90");
    assert_eq!(r.status(), HealthStatus::Excellent);

    let layout = certificate_layout(&r, false, false);
    assert_eq!(badge_fill(&layout), [0.0, 0.7, 0.0]);
    assert!(has_text(&layout, "Excellent"));
    assert!(has_text(&layout, "Tesla"));
    assert!(has_text(&layout, "Model Y"));
    assert!(has_text(&layout, "90%"));
    assert!((gauge_sweep(&layout) - 324.0).abs() < 1e-4);

    let bytes = render_certificate(&r, None, &RenderAssets::default()).unwrap();
    assert_valid_pdf(&bytes);
}

// =====================================================================
// Determinism
// =====================================================================

#[test]
fn layout_is_identical_across_invocations() {
    let a = certificate_layout(&record("72"), true, true);
    let b = certificate_layout(&record("72"), true, true);
    assert_eq!(a, b);
}

#[test]
fn pdf_output_is_stable() {
    let r = record("72");
    let bytes1 = render_certificate(&r, None, &RenderAssets::default()).unwrap();
    let bytes2 = render_certificate(&r, None, &RenderAssets::default()).unwrap();

    // printpdf embeds timestamps, so byte-exact equality isn't guaranteed.
    // Instead, check that the sizes are within a small tolerance.
    let diff = (bytes1.len() as i64 - bytes2.len() as i64).unsigned_abs();
    assert!(
        diff < 200,
        "PDF outputs differ significantly: {} vs {} bytes",
        bytes1.len(),
        bytes2.len()
    );
}

#[test]
fn layout_json_roundtrip() {
    let layout = certificate_layout(&record("55"), true, false);
    let json = layout.to_json();
    let parsed: CertificateLayout = serde_json::from_str(&json).unwrap();
    assert_eq!(layout, parsed);
}

// =====================================================================
// QR embedding
// =====================================================================

#[test]
fn qr_layer_grows_the_artifact() {
    let r = record("90");
    let without = render_certificate(&r, None, &RenderAssets::default()).unwrap();
    let qr = QrArtifact::encode("https://res.cloudinary.com/demo/image/upload/x.pdf").unwrap();
    let with = render_certificate(&r, Some(&qr), &RenderAssets::default()).unwrap();
    assert_valid_pdf(&with);
    assert!(with.len() > without.len());

    let layout = certificate_layout(&r, true, false);
    assert!(layout.primitives.iter().any(|p| matches!(
        p,
        Primitive::Image { slot: ImageSlot::Qr, width, height, .. }
            if width == height
    )));
}

// =====================================================================
// Publication workflow with an injected store fake
// =====================================================================

struct ScriptedStore {
    uploads: RefCell<Vec<(String, u64)>>,
}

impl RemoteStore for ScriptedStore {
    fn upload(&self, file: &Path, public_id: &str) -> battcert::Result<UploadResult> {
        let size = std::fs::metadata(file).unwrap().len();
        self.uploads.borrow_mut().push((public_id.to_string(), size));
        Ok(UploadResult {
            secure_url: format!("https://res.cloudinary.com/test/image/upload/{public_id}.pdf"),
            public_id: public_id.to_string(),
        })
    }
}

#[test]
fn publication_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let store = ScriptedStore {
        uploads: RefCell::new(Vec::new()),
    };

    let out = publish_in(&record("90"), &store, &RenderAssets::default(), dir.path()).unwrap();

    let uploads = store.uploads.borrow();
    assert_eq!(uploads.len(), 2, "draft then final");
    assert_ne!(uploads[0].0, uploads[1].0, "distinct object identifiers");
    // Final upload carries the QR layer, so it is strictly larger.
    assert!(uploads[1].1 > uploads[0].1);

    assert_eq!(
        out.qr_url,
        format!(
            "https://res.cloudinary.com/test/image/upload/{}.pdf",
            uploads[0].0
        )
    );
    assert!(out.url.contains(&uploads[1].0));
    assert_valid_pdf(&out.bytes);

    assert_eq!(
        std::fs::read_dir(dir.path()).unwrap().count(),
        0,
        "no temp artifacts survive publication"
    );
}
