//! Certificate input record and the health-status derivation.
//!
//! All date fields arrive pre-formatted (`DD/MM/YYYY`) and all free-text
//! fields are rendered verbatim; the only parsing the renderer performs is
//! on the state-of-health value, which may carry a trailing `%` and
//! surrounding whitespace.

use serde::{Deserialize, Serialize};

/// Categorical battery status, derived from the state-of-health percentage.
///
/// The status is never stored on the record: deriving it at the point of
/// use keeps badge and gauge consistent with the percentage by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Bad,
}

impl HealthStatus {
    /// Threshold table: >85 Excellent, 65..=85 Good, <65 Bad.
    pub fn from_percent(percent: u8) -> Self {
        if percent > 85 {
            HealthStatus::Excellent
        } else if percent >= 65 {
            HealthStatus::Good
        } else {
            HealthStatus::Bad
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::Bad => "Bad",
        }
    }

    /// Fill colour shared by the badge and the gauge arc.
    pub fn color(self) -> [f32; 3] {
        match self {
            HealthStatus::Excellent => [0.0, 0.7, 0.0], // green
            HealthStatus::Good => [1.0, 0.65, 0.0],     // amber
            HealthStatus::Bad => [0.9, 0.0, 0.0],       // red
        }
    }
}

/// Immutable input to a render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Test date, `DD/MM/YYYY`.
    pub test_date: String,
    pub tested_by: String,
    pub make: String,
    pub model: String,
    pub registration: String,
    /// First-registration date, `DD/MM/YYYY`.
    pub first_registered: String,
    pub vin: String,
    pub mileage: String,
    /// Battery capacity, rendered verbatim with a " kWh" suffix.
    pub battery_kwh: String,
    /// Raw state-of-health value, e.g. `"90"`, `"90%"`, `" 47 "`.
    pub state_of_health: String,
}

impl CertificateRecord {
    /// Parse a record from its JSON form.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parsed state of health in [0,100].
    ///
    /// Strips a trailing `%` and whitespace. Non-numeric or out-of-range
    /// input degrades to 0 — a malformed form value must never abort a
    /// render.
    pub fn soh_percent(&self) -> u8 {
        parse_percent(&self.state_of_health)
    }

    pub fn status(&self) -> HealthStatus {
        HealthStatus::from_percent(self.soh_percent())
    }
}

/// Clean and parse a percentage string; 0 on any failure.
pub fn parse_percent(raw: &str) -> u8 {
    let cleaned = raw.trim().trim_end_matches('%').trim();
    match cleaned.parse::<i64>() {
        Ok(v) if (0..=100).contains(&v) => v as u8,
        _ => 0,
    }
}
