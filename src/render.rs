//! PDF renderer – turns a [`CertificateLayout`] into PDF bytes using
//! `printpdf` (v0.8 ops-based API).
//!
//! Image layers degrade gracefully: a background or QR image that is absent
//! or fails to decode is skipped with a `log::warn`, never an error. All
//! curved shapes (gauge ring, arc, badge corners) are emitted as fine
//! polyline approximations.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::path::Path;

use printpdf::*;

use crate::error::Result;
use crate::fonts;
use crate::layout::{certificate_layout, CertificateLayout, ImageSlot, Primitive, TextAlign};
use crate::qr::QrArtifact;
use crate::record::CertificateRecord;

/// Arc flattening step in degrees.
const ARC_STEP_DEG: f32 = 2.0;

/// Optional image inputs to a render pass.
///
/// The contract states up front which layers are optional: a `None`
/// background simply leaves the page blank behind the text.
#[derive(Debug, Clone, Default)]
pub struct RenderAssets {
    /// Raw bytes of the full-bleed background template (PNG or JPEG).
    pub background: Option<Vec<u8>>,
}

impl RenderAssets {
    /// Load the background template from a known path, tolerating absence.
    pub fn from_background_path(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Self {
                background: Some(bytes),
            },
            Err(e) => {
                log::info!(
                    "background template '{}' not loaded ({e}); rendering without it",
                    path.display()
                );
                Self { background: None }
            }
        }
    }
}

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render one certificate into single-page A4 PDF bytes.
///
/// Deterministic for a fixed record, QR and background: the layout carries
/// no ambient state. Only printpdf's own metadata timestamps vary between
/// invocations.
pub fn render_certificate(
    record: &CertificateRecord,
    qr: Option<&QrArtifact>,
    assets: &RenderAssets,
) -> Result<Vec<u8>> {
    let layout = certificate_layout(record, qr.is_some(), assets.background.is_some());
    render_layout(&layout, qr, assets)
}

/// Render a precomputed layout. Split out so tests can render doctored
/// primitive lists directly.
pub fn render_layout(
    layout: &CertificateLayout,
    qr: Option<&QrArtifact>,
    assets: &RenderAssets,
) -> Result<Vec<u8>> {
    let page_w = Mm(layout.page_width_pt * 0.352778); // pt → mm
    let page_h = Mm(layout.page_height_pt * 0.352778);

    let mut doc = PdfDocument::new("Battery Health Certificate");

    // ── Register image layers up front ────────────────────────────────────
    let mut images: HashMap<ImageSlot, ImageResource> = HashMap::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();

    if let Some(bytes) = &assets.background {
        register_image(&mut doc, &mut images, &mut warnings, ImageSlot::Background, bytes);
    }
    if let Some(qr) = qr {
        register_image(&mut doc, &mut images, &mut warnings, ImageSlot::Qr, qr.png_bytes());
    }

    // ── Emit page ops ─────────────────────────────────────────────────────
    let mut ops = Vec::new();
    for prim in &layout.primitives {
        render_primitive(&mut ops, prim, layout.page_height_pt, &images);
    }

    let page = PdfPage::new(page_w, page_h, ops);
    doc.with_pages(vec![page]);
    Ok(doc.save(&PdfSaveOptions::default(), &mut Vec::new()))
}

/// Decode an image and register it as a reusable XObject. Decode failures
/// drop the layer, matching the missing-asset contract.
fn register_image(
    doc: &mut PdfDocument,
    images: &mut HashMap<ImageSlot, ImageResource>,
    warnings: &mut Vec<PdfWarnMsg>,
    slot: ImageSlot,
    bytes: &[u8],
) {
    let dyn_img = match ::image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            log::warn!("skipping {slot:?} layer — decode error: {e}");
            return;
        }
    };
    let (px_width, px_height) = (dyn_img.width(), dyn_img.height());

    let raw = match RawImage::decode_from_bytes(bytes, warnings) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("skipping {slot:?} layer — PDF encode error: {e}");
            return;
        }
    };
    let xobj_id = doc.add_image(&raw);
    images.insert(
        slot,
        ImageResource {
            xobj_id,
            px_width,
            px_height,
        },
    );
}

fn render_primitive(
    ops: &mut Vec<Op>,
    prim: &Primitive,
    page_height: f32,
    images: &HashMap<ImageSlot, ImageResource>,
) {
    match prim {
        Primitive::Text {
            x,
            y,
            size,
            color,
            align,
            content,
        } => {
            if content.is_empty() {
                return;
            }
            let start_x = match align {
                TextAlign::Left => *x,
                TextAlign::Center => *x - fonts::text_width(content, *size, true) / 2.0,
            };
            // Layout `y` is a baseline offset from the page top.
            let baseline_y = page_height - *y;

            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point {
                    x: Pt(start_x),
                    y: Pt(baseline_y),
                },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(*size),
                font: BuiltinFont::HelveticaBold,
            });
            ops.push(Op::SetFillColor { col: rgb(*color) });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(content))],
                font: BuiltinFont::HelveticaBold,
            });
            ops.push(Op::EndTextSection);
        }

        Primitive::RoundedRect {
            x,
            y,
            width,
            height,
            radius,
            fill,
        } => {
            let bottom = page_height - *y - *height;
            ops.push(Op::SetFillColor { col: rgb(*fill) });
            ops.push(Op::DrawPolygon {
                polygon: Polygon {
                    rings: vec![PolygonRing {
                        points: rounded_rect_points(*x, bottom, *width, *height, *radius),
                    }],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                },
            });
        }

        Primitive::Ring {
            cx,
            cy,
            radius,
            stroke_width,
            color,
        } => {
            stroke_arc(ops, *cx, page_height - *cy, *radius, 360.0, *stroke_width, *color);
        }

        Primitive::GaugeArc {
            cx,
            cy,
            radius,
            stroke_width,
            color,
            sweep_deg,
        } => {
            if *sweep_deg > 0.0 {
                stroke_arc(
                    ops,
                    *cx,
                    page_height - *cy,
                    *radius,
                    *sweep_deg,
                    *stroke_width,
                    *color,
                );
            }
        }

        Primitive::Image {
            slot,
            x,
            y,
            width,
            height,
        } => {
            let Some(res) = images.get(slot) else {
                return;
            };
            // PDF origin is bottom-left; layout origin is top-left.
            let img_bottom_y = page_height - *y - *height;

            // At dpi=72 printpdf renders 1 px = 1 pt, so
            // scale = desired_pt / px_dim.
            let scale_x = if res.px_width > 0 {
                *width / res.px_width as f32
            } else {
                1.0
            };
            let scale_y = if res.px_height > 0 {
                *height / res.px_height as f32
            } else {
                1.0
            };

            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(*x)),
                    translate_y: Some(Pt(img_bottom_y)),
                    dpi: Some(72.0),
                    scale_x: Some(scale_x),
                    scale_y: Some(scale_y),
                    rotate: None,
                },
            });
        }
    }
}

fn rgb(c: [f32; 3]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

/// Stroke a circular arc starting at 12 o'clock, sweeping clockwise.
/// `cy_pdf` is already in PDF (bottom-left origin) coordinates. A sweep of
/// 360 closes into the gauge's background ring.
fn stroke_arc(
    ops: &mut Vec<Op>,
    cx: f32,
    cy_pdf: f32,
    radius: f32,
    sweep_deg: f32,
    stroke_width: f32,
    color: [f32; 3],
) {
    let full = sweep_deg >= 360.0;
    let steps = ((sweep_deg / ARC_STEP_DEG).ceil() as usize).max(2);
    let points: Vec<LinePoint> = (0..=steps)
        .map(|i| {
            let t = sweep_deg * i as f32 / steps as f32;
            let angle = (90.0 - t) * PI / 180.0;
            LinePoint {
                p: Point {
                    x: Pt(cx + radius * angle.cos()),
                    y: Pt(cy_pdf + radius * angle.sin()),
                },
                bezier: false,
            }
        })
        .collect();

    ops.push(Op::SetOutlineColor { col: rgb(color) });
    ops.push(Op::SetOutlineThickness {
        pt: Pt(stroke_width),
    });
    ops.push(Op::DrawLine {
        line: Line {
            points,
            is_closed: full,
        },
    });
}

/// Counter-clockwise outline of a rounded rectangle, corners flattened to
/// short segments. `(x, y)` is the bottom-left corner in PDF coordinates.
fn rounded_rect_points(x: f32, y: f32, w: f32, h: f32, r: f32) -> Vec<LinePoint> {
    let r = r.min(w / 2.0).min(h / 2.0);
    let corner_steps = 6;
    // Corner centres and their start angle, walking counter-clockwise from
    // the bottom-right corner.
    let corners = [
        (x + w - r, y + r, 270.0_f32),   // bottom-right
        (x + w - r, y + h - r, 0.0_f32), // top-right
        (x + r, y + h - r, 90.0_f32),    // top-left
        (x + r, y + r, 180.0_f32),       // bottom-left
    ];
    let mut points = Vec::with_capacity(4 * (corner_steps + 1));
    for (ccx, ccy, start) in corners {
        for i in 0..=corner_steps {
            let angle = (start + 90.0 * i as f32 / corner_steps as f32) * PI / 180.0;
            points.push(LinePoint {
                p: Point {
                    x: Pt(ccx + r * angle.cos()),
                    y: Pt(ccy + r * angle.sin()),
                },
                bezier: false,
            });
        }
    }
    points
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2013}' => 0x96, // en-dash
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0x9F range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout;

    fn record() -> CertificateRecord {
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
            state_of_health: "90".into(),
        }
    }

    #[test]
    fn render_without_optional_layers() {
        let bytes = render_certificate(&record(), None, &RenderAssets::default()).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        // PDF magic number
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn undecodable_background_is_skipped_not_fatal() {
        let assets = RenderAssets {
            background: Some(vec![0xde, 0xad, 0xbe, 0xef]),
        };
        let bytes = render_certificate(&record(), None, &assets).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn missing_background_path_yields_none() {
        let assets =
            RenderAssets::from_background_path(Path::new("/nonexistent/certificate_bg.jpg"));
        assert!(assets.background.is_none());
    }

    #[test]
    fn zero_sweep_emits_no_arc_stroke() {
        let mut ops = Vec::new();
        render_primitive(
            &mut ops,
            &Primitive::GaugeArc {
                cx: 100.0,
                cy: 100.0,
                radius: 65.0,
                stroke_width: 20.0,
                color: [0.9, 0.0, 0.0],
                sweep_deg: 0.0,
            },
            layout::PAGE_HEIGHT_PT,
            &HashMap::new(),
        );
        assert!(ops.is_empty());
    }

    #[test]
    fn rounded_rect_outline_stays_inside_bounds() {
        let pts = rounded_rect_points(10.0, 10.0, 80.0, 20.0, 6.0);
        for lp in &pts {
            assert!(lp.p.x.0 >= 10.0 - 1e-3 && lp.p.x.0 <= 90.0 + 1e-3);
            assert!(lp.p.y.0 >= 10.0 - 1e-3 && lp.p.y.0 <= 30.0 + 1e-3);
        }
    }
}
