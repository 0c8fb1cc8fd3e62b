//! Core domain types for the PRP dosage calculator.
//!
//! This module defines the fundamental types used throughout the system:
//! - Dosage inputs (patient count and protocol parameters)
//! - Treatment zones
//! - Derived concentrations, per-zone plans and feedback
//! - The aggregate dosage plan

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Default PRP volume extracted per processed tube (ml)
pub const DEFAULT_PRP_YIELD_ML: f64 = 1.0;

/// Default PRP concentration multiplier over baseline
pub const DEFAULT_PRP_CONCENTRATION_X: f64 = 7.0;

/// Default PPP concentration multiplier over baseline
pub const DEFAULT_PPP_CONCENTRATION_X: f64 = 0.5;

/// Lower bound of the therapeutic window (platelets/µL)
pub const OPTIMAL_MIN_PLATELETS_PER_UL: f64 = 1_000_000.0;

/// Upper bound of the therapeutic window and dilution target (platelets/µL)
pub const OPTIMAL_MAX_PLATELETS_PER_UL: f64 = 1_500_000.0;

// ============================================================================
// Inputs
// ============================================================================

/// Patient and protocol parameters for one calculation.
///
/// Echoed back verbatim as `input_parameters` in the plan.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct DosageInputs {
    /// Blood platelet count, ×10⁹/L
    pub thrombocytes_gl: f64,
    pub prp_yield_ml: f64,
    pub prp_concentration_x: f64,
    pub ppp_concentration_x: f64,
}

impl DosageInputs {
    /// Inputs for a patient count with the built-in protocol defaults
    pub fn new(thrombocytes_gl: f64) -> Self {
        Self {
            thrombocytes_gl,
            prp_yield_ml: DEFAULT_PRP_YIELD_ML,
            prp_concentration_x: DEFAULT_PRP_CONCENTRATION_X,
            ppp_concentration_x: DEFAULT_PPP_CONCENTRATION_X,
        }
    }

    pub fn with_prp_yield(mut self, prp_yield_ml: f64) -> Self {
        self.prp_yield_ml = prp_yield_ml;
        self
    }

    pub fn with_prp_concentration(mut self, prp_concentration_x: f64) -> Self {
        self.prp_concentration_x = prp_concentration_x;
        self
    }

    pub fn with_ppp_concentration(mut self, ppp_concentration_x: f64) -> Self {
        self.ppp_concentration_x = ppp_concentration_x;
        self
    }
}

// ============================================================================
// Zones
// ============================================================================

/// A fixed anatomical treatment area
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Zone {
    pub key: &'static str,
    pub display_name: &'static str,
    /// Platelets to deliver to the zone
    pub target_platelet_count: f64,
    pub minimum_injection_volume_ml: f64,
}

// ============================================================================
// Results
// ============================================================================

/// Concentration figures derived once from the inputs and shared by all zones
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConcentrationFigures {
    pub baseline_platelets_per_ul: f64,
    pub final_prp_concentration_per_ul: f64,
    /// Final PRP concentration in millions/µL, rounded to two decimals
    pub final_prp_concentration_millions: f64,
    pub final_ppp_concentration_per_ul: f64,
    pub platelets_per_ml_of_prp: f64,
}

/// Dosing plan for a single zone.
///
/// Volumes are held at full precision and rounded to one decimal when
/// serialized.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ZonePlan {
    pub zone_name: String,
    pub tubes_needed: u64,
    #[serde(serialize_with = "serialize_volume")]
    pub total_injection_volume_ml: f64,
    #[serde(serialize_with = "serialize_volume")]
    pub total_prp_volume_ml: f64,
    #[serde(serialize_with = "serialize_volume")]
    pub total_ppp_needed_ml: f64,
    #[serde(serialize_with = "serialize_volume")]
    pub dilution_ppp_ml: f64,
    #[serde(serialize_with = "serialize_volume")]
    pub top_up_ppp_ml: f64,
    #[serde(serialize_with = "serialize_volume")]
    pub extract_volume_per_tube_ml: f64,
    pub target_platelets: f64,
    pub min_volume_ml: f64,
}

/// Qualitative classification of the final PRP concentration
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Warning,
    Info,
    Success,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Warning => "warning",
            FeedbackKind::Info => "info",
            FeedbackKind::Success => "success",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub message: String,
}

/// The complete result of one calculation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DosagePlan {
    pub input_parameters: DosageInputs,
    pub calculated_concentrations: ConcentrationFigures,
    pub concentration_feedback: Feedback,
    /// Zone key → plan
    pub zones: BTreeMap<String, ZonePlan>,
}

impl DosagePlan {
    pub fn zone(&self, key: &str) -> Option<&ZonePlan> {
        self.zones.get(key)
    }
}

// ============================================================================
// Rounding
// ============================================================================

/// Round to a number of decimal places.
///
/// Rounds the exact binary value in decimal, so `2.675` (stored as
/// 2.67499...) becomes `2.67` rather than `2.68`.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

fn serialize_volume<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let inputs = DosageInputs::new(200.0);
        assert_eq!(inputs.prp_yield_ml, 1.0);
        assert_eq!(inputs.prp_concentration_x, 7.0);
        assert_eq!(inputs.ppp_concentration_x, 0.5);
    }

    #[test]
    fn test_builders_override_defaults() {
        let inputs = DosageInputs::new(150.0)
            .with_prp_yield(1.5)
            .with_prp_concentration(5.0)
            .with_ppp_concentration(0.0);
        assert_eq!(inputs.prp_yield_ml, 1.5);
        assert_eq!(inputs.prp_concentration_x, 5.0);
        assert_eq!(inputs.ppp_concentration_x, 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.4444, 1), 1.4);
        assert_eq!(round_to(2.8889, 1), 2.9);
        assert_eq!(round_to(2.675, 2), 2.67);
        assert_eq!(round_to(1.4, 2), 1.4);
    }

    #[test]
    fn test_zone_plan_serializes_rounded_volumes() {
        let plan = ZonePlan {
            zone_name: "Full Scalp".into(),
            tubes_needed: 2,
            total_injection_volume_ml: 2.888_888_9,
            total_prp_volume_ml: 2.0,
            total_ppp_needed_ml: 0.888_888_9,
            dilution_ppp_ml: 0.888_888_9,
            top_up_ppp_ml: 0.0,
            extract_volume_per_tube_ml: 1.444_444_4,
            target_platelets: 3.5e9,
            min_volume_ml: 2.0,
        };

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["total_injection_volume_ml"], 2.9);
        assert_eq!(json["total_ppp_needed_ml"], 0.9);
        assert_eq!(json["extract_volume_per_tube_ml"], 1.4);
        assert_eq!(json["target_platelets"], 3.5e9);
    }

    #[test]
    fn test_feedback_type_field_name() {
        let feedback = Feedback {
            kind: FeedbackKind::Success,
            message: "ok".into(),
        };
        let json = serde_json::to_value(&feedback).unwrap();
        assert_eq!(json["type"], "success");
    }
}
