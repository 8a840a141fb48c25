//! Certificate layout – maps a [`CertificateRecord`] to a flat list of
//! positioned drawing primitives, the "frozen" intermediate representation
//! consumed by [`crate::render`].
//!
//! Every position below is a fixed constant of the certificate design.
//! Vertical offsets are measured from the page top; text offsets are
//! baseline offsets, matching the background template artwork. The offsets
//! are tunable; the threshold colours and the gauge sweep proportion are
//! contractual.

use serde::{Deserialize, Serialize};

use crate::fonts;
use crate::record::CertificateRecord;

/// ISO A4 in PDF points.
pub const PAGE_WIDTH_PT: f32 = 595.28;
pub const PAGE_HEIGHT_PT: f32 = 841.89;

const BODY_SIZE: f32 = 14.0;
const GAUGE_LABEL_SIZE: f32 = 28.0;
const SUMMARY_LABEL_SIZE: f32 = 32.0;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const RING_GRAY: [f32; 3] = [0.8, 0.8, 0.8];

// Header row baselines.
const HEADER_Y: f32 = 214.0;
const TEST_DATE_X: f32 = 80.0;
const TESTED_BY_X: f32 = 287.0;

// Status badge: rounded rect sized from the measured label width.
const BADGE_TEXT_X: f32 = 507.0;
const BADGE_PAD_X: f32 = 12.0;
const BADGE_PAD_Y: f32 = 6.0;
const BADGE_RADIUS: f32 = 6.0;
const BADGE_DESCENT: f32 = 5.0;

// Vehicle detail block, two columns.
const DETAIL_LEFT_X: f32 = 80.0;
const DETAIL_RIGHT_X: f32 = 430.0;
const ROW_MAKE_Y: f32 = 354.0;
const ROW_MODEL_Y: f32 = 392.0;
const ROW_VIN_Y: f32 = 431.0;
const ROW_MILEAGE_Y: f32 = 432.0;
const BATTERY_X: f32 = 200.0;
const BATTERY_Y: f32 = 551.0;

// Circular health gauge.
const GAUGE_CENTER_Y: f32 = 740.0;
const GAUGE_RADIUS: f32 = 65.0;
const GAUGE_STROKE: f32 = 20.0;
const GAUGE_LABEL_LIFT: f32 = 10.0;
const SUMMARY_GAP: f32 = 20.0;

// QR panel in the top-right header area.
pub const QR_SIZE_PT: f32 = 90.0;
const QR_X: f32 = 480.0;
const QR_Y: f32 = 80.0;

/// Which registered image a primitive refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSlot {
    Background,
    Qr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    /// `x` is the left edge of the run.
    Left,
    /// `x` is the horizontal centre of the run.
    Center,
}

/// One drawing instruction. All text is Helvetica-Bold; `y` fields are
/// offsets from the page top (baseline for text, top edge for rects and
/// images, centre for circles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Text {
        x: f32,
        y: f32,
        size: f32,
        color: [f32; 3],
        align: TextAlign,
        content: String,
    },
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: [f32; 3],
    },
    /// Full background ring of the gauge.
    Ring {
        cx: f32,
        cy: f32,
        radius: f32,
        stroke_width: f32,
        color: [f32; 3],
    },
    /// Gauge arc from 12 o'clock, sweeping clockwise.
    GaugeArc {
        cx: f32,
        cy: f32,
        radius: f32,
        stroke_width: f32,
        color: [f32; 3],
        sweep_deg: f32,
    },
    Image {
        slot: ImageSlot,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

/// A complete single-page certificate ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateLayout {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub primitives: Vec<Primitive>,
}

impl CertificateLayout {
    /// Serialise to JSON, mainly for debugging layout changes.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Compute the certificate layout for one record.
///
/// Pure and deterministic: the same record and the same flags always yield
/// the same primitive list. `has_background`/`has_qr` control whether the
/// corresponding image layers are emitted; the renderer degrades the same
/// way when an asset fails to decode.
pub fn certificate_layout(
    record: &CertificateRecord,
    has_qr: bool,
    has_background: bool,
) -> CertificateLayout {
    let percent = record.soh_percent();
    let status = record.status();
    let mut prims = Vec::new();

    if has_background {
        prims.push(Primitive::Image {
            slot: ImageSlot::Background,
            x: 0.0,
            y: 0.0,
            width: PAGE_WIDTH_PT,
            height: PAGE_HEIGHT_PT,
        });
    }

    // Header row.
    prims.push(text(TEST_DATE_X, HEADER_Y, BODY_SIZE, WHITE, &record.test_date));
    prims.push(text(TESTED_BY_X, HEADER_Y, BODY_SIZE, WHITE, &record.tested_by));

    // Status badge: colour-keyed pill behind the label, label on top.
    let label = status.label();
    let label_width = fonts::text_width(label, BODY_SIZE, true);
    let badge_height = BODY_SIZE + BADGE_PAD_Y;
    prims.push(Primitive::RoundedRect {
        x: BADGE_TEXT_X - BADGE_DESCENT,
        y: HEADER_Y + BADGE_DESCENT - badge_height,
        width: label_width + BADGE_PAD_X,
        height: badge_height,
        radius: BADGE_RADIUS,
        fill: status.color(),
    });
    prims.push(text(BADGE_TEXT_X, HEADER_Y, BODY_SIZE, WHITE, label));

    // Vehicle details.
    prims.push(text(DETAIL_LEFT_X, ROW_MAKE_Y, BODY_SIZE, BLACK, &record.make));
    prims.push(text(DETAIL_RIGHT_X, ROW_MAKE_Y, BODY_SIZE, BLACK, &record.registration));
    prims.push(text(DETAIL_LEFT_X, ROW_MODEL_Y, BODY_SIZE, BLACK, &record.model));
    prims.push(text(DETAIL_RIGHT_X, ROW_MODEL_Y, BODY_SIZE, BLACK, &record.first_registered));
    prims.push(text(DETAIL_LEFT_X, ROW_VIN_Y, BODY_SIZE, BLACK, &record.vin));
    prims.push(text(DETAIL_RIGHT_X, ROW_MILEAGE_Y, BODY_SIZE, BLACK, &record.mileage));

    prims.push(text(
        BATTERY_X,
        BATTERY_Y,
        BODY_SIZE,
        BLACK,
        &format!("{} kWh", record.battery_kwh),
    ));

    // Health gauge: gray track ring, then the proportional arc on top.
    let cx = PAGE_WIDTH_PT / 2.0;
    prims.push(Primitive::Ring {
        cx,
        cy: GAUGE_CENTER_Y,
        radius: GAUGE_RADIUS,
        stroke_width: GAUGE_STROKE,
        color: RING_GRAY,
    });
    prims.push(Primitive::GaugeArc {
        cx,
        cy: GAUGE_CENTER_Y,
        radius: GAUGE_RADIUS,
        stroke_width: GAUGE_STROKE,
        color: status.color(),
        sweep_deg: 360.0 * f32::from(percent) / 100.0,
    });

    let percent_label = format!("{percent}%");
    prims.push(Primitive::Text {
        x: cx,
        y: GAUGE_CENTER_Y + GAUGE_LABEL_LIFT,
        size: GAUGE_LABEL_SIZE,
        color: WHITE,
        align: TextAlign::Center,
        content: percent_label.clone(),
    });
    prims.push(Primitive::Text {
        x: cx,
        y: GAUGE_CENTER_Y + GAUGE_RADIUS + SUMMARY_GAP,
        size: SUMMARY_LABEL_SIZE,
        color: BLACK,
        align: TextAlign::Center,
        content: percent_label,
    });

    if has_qr {
        prims.push(Primitive::Image {
            slot: ImageSlot::Qr,
            x: QR_X,
            y: QR_Y,
            width: QR_SIZE_PT,
            height: QR_SIZE_PT,
        });
    }

    CertificateLayout {
        page_width_pt: PAGE_WIDTH_PT,
        page_height_pt: PAGE_HEIGHT_PT,
        primitives: prims,
    }
}

fn text(x: f32, y: f32, size: f32, color: [f32; 3], content: &str) -> Primitive {
    Primitive::Text {
        x,
        y,
        size,
        color,
        align: TextAlign::Left,
        content: content.to_string(),
    }
}
