//! Dosage calculator: patient/protocol inputs to a per-zone dosing plan.
//!
//! This module implements the calculation:
//! - Validate the positive parameters
//! - Derive the shared concentration figures once
//! - Plan each built-in zone independently (tube count, dilution, top-up)
//! - Classify the final PRP concentration

use crate::types::{
    round_to, ConcentrationFigures, DosageInputs, DosagePlan, Zone, ZonePlan,
    OPTIMAL_MAX_PLATELETS_PER_UL,
};
use crate::{feedback, zones, Error, Result};
use std::collections::BTreeMap;

/// Compute the dosing plan for the built-in zones
///
/// ## Per-zone steps
///
/// 1. **Required PRP**: target platelets / platelets per ml of PRP
/// 2. **Tubes**: ceiling of required PRP / yield, so extraction never falls short
/// 3. **Dilution**: when PRP exceeds 1.5M/µL, add PPP to bring the mix down to 1.5M/µL
///    (skipped when PPP itself is at or above 1.5M/µL)
/// 4. **Top-up**: add PPP until the minimum injection volume is reached
///
/// Validation happens before any zone is planned; no partial plan is returned.
pub fn compute(inputs: &DosageInputs) -> Result<DosagePlan> {
    validate(inputs)?;

    let concentrations = derive_concentrations(inputs);

    let zones = zones::ZONES
        .iter()
        .map(|zone| Ok((zone.key.to_string(), plan_zone(zone, inputs, &concentrations)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    let concentration_feedback = feedback::classify(concentrations.final_prp_concentration_per_ul);

    tracing::info!(
        "Computed PRP plan: {:.2}M platelets/µL ({})",
        concentrations.final_prp_concentration_millions,
        concentration_feedback.kind.as_str()
    );

    Ok(DosagePlan {
        input_parameters: *inputs,
        calculated_concentrations: concentrations,
        concentration_feedback,
        zones,
    })
}

/// Positivity checks, first failure wins
///
/// `ppp_concentration_x` is deliberately unconstrained.
fn validate(inputs: &DosageInputs) -> Result<()> {
    if !is_positive(inputs.thrombocytes_gl) {
        return Err(Error::InvalidInput(
            "Patient thrombocytes must be greater than 0".into(),
        ));
    }
    if !is_positive(inputs.prp_yield_ml) {
        return Err(Error::InvalidInput(
            "PRP yield per tube must be greater than 0".into(),
        ));
    }
    if !is_positive(inputs.prp_concentration_x) {
        return Err(Error::InvalidInput(
            "PRP concentration must be greater than 0".into(),
        ));
    }
    Ok(())
}

// NaN is not positive
fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn derive_concentrations(inputs: &DosageInputs) -> ConcentrationFigures {
    let baseline_platelets_per_ul = inputs.thrombocytes_gl * 1000.0;
    let final_prp_concentration_per_ul = baseline_platelets_per_ul * inputs.prp_concentration_x;
    let final_ppp_concentration_per_ul = baseline_platelets_per_ul * inputs.ppp_concentration_x;
    let platelets_per_ml_of_prp = final_prp_concentration_per_ul * 1000.0;

    ConcentrationFigures {
        baseline_platelets_per_ul,
        final_prp_concentration_per_ul,
        final_prp_concentration_millions: round_to(final_prp_concentration_per_ul / 1_000_000.0, 2),
        final_ppp_concentration_per_ul,
        platelets_per_ml_of_prp,
    }
}

fn plan_zone(zone: &Zone, inputs: &DosageInputs, c: &ConcentrationFigures) -> Result<ZonePlan> {
    let required_prp_ml = if c.platelets_per_ml_of_prp > 0.0 {
        zone.target_platelet_count / c.platelets_per_ml_of_prp
    } else {
        0.0
    };

    let tubes_needed = if inputs.prp_yield_ml > 0.0 {
        tube_count(zone, (required_prp_ml / inputs.prp_yield_ml).ceil())?
    } else {
        0
    };

    let total_prp_ml = tubes_needed as f64 * inputs.prp_yield_ml;

    let mut dilution_ppp_ml = 0.0;
    if c.final_prp_concentration_per_ul > OPTIMAL_MAX_PLATELETS_PER_UL {
        let denominator = OPTIMAL_MAX_PLATELETS_PER_UL - c.final_ppp_concentration_per_ul;
        if denominator > 0.0 {
            dilution_ppp_ml = total_prp_ml
                * (c.final_prp_concentration_per_ul - OPTIMAL_MAX_PLATELETS_PER_UL)
                / denominator;
        } else {
            tracing::warn!(
                "PPP concentration {:.0}/µL is not below the dilution target; skipping dilution for {}",
                c.final_ppp_concentration_per_ul,
                zone.key
            );
        }
    }

    let volume_after_dilution = total_prp_ml + dilution_ppp_ml;
    let top_up_ppp_ml = (zone.minimum_injection_volume_ml - volume_after_dilution).max(0.0);

    let total_ppp_needed_ml = dilution_ppp_ml + top_up_ppp_ml;
    let total_injection_volume_ml = total_prp_ml + total_ppp_needed_ml;
    let extract_volume_per_tube_ml = if tubes_needed > 0 {
        total_injection_volume_ml / tubes_needed as f64
    } else {
        0.0
    };

    tracing::debug!(
        "Zone {}: required {:.3} ml PRP, {} tubes, dilution {:.3} ml, top-up {:.3} ml",
        zone.key,
        required_prp_ml,
        tubes_needed,
        dilution_ppp_ml,
        top_up_ppp_ml
    );

    Ok(ZonePlan {
        zone_name: zone.display_name.to_string(),
        tubes_needed,
        total_injection_volume_ml,
        total_prp_volume_ml: total_prp_ml,
        total_ppp_needed_ml,
        dilution_ppp_ml,
        top_up_ppp_ml,
        extract_volume_per_tube_ml,
        target_platelets: zone.target_platelet_count,
        min_volume_ml: zone.minimum_injection_volume_ml,
    })
}

/// Largest tube count whose extracted volume is still exact in f64
const MAX_TUBES: f64 = 9_007_199_254_740_992.0; // 2^53

/// Convert a rounded-up tube count without saturating
///
/// A count that cannot be represented would under-dose, so it is an error.
fn tube_count(zone: &Zone, tubes: f64) -> Result<u64> {
    if !tubes.is_finite() || tubes > MAX_TUBES {
        return Err(Error::Calculation(format!(
            "{} requires {} tubes, beyond the supported tube count",
            zone.display_name, tubes
        )));
    }
    Ok(tubes.max(0.0) as u64)
}
