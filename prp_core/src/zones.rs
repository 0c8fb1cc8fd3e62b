//! Built-in treatment zones.
//!
//! Zones are fixed protocol constants and are not user-configurable.

use crate::types::Zone;

pub const TEMPORAL_CROWN: Zone = Zone {
    key: "temporal_crown",
    display_name: "Temporal/Crown",
    target_platelet_count: 1.75e9,
    minimum_injection_volume_ml: 2.0,
};

pub const FULL_SCALP: Zone = Zone {
    key: "full_scalp",
    display_name: "Full Scalp",
    target_platelet_count: 3.5e9,
    minimum_injection_volume_ml: 2.0,
};

/// All zones, in the order they are planned
pub const ZONES: [Zone; 2] = [TEMPORAL_CROWN, FULL_SCALP];

/// Look up a built-in zone by key
pub fn find_zone(key: &str) -> Option<&'static Zone> {
    ZONES.iter().find(|zone| zone.key == key)
}

/// Self-check of a zone table
///
/// Returns a list of problems; empty means the table is usable.
pub fn validate_zones(zones: &[Zone]) -> Vec<String> {
    let mut errors = Vec::new();

    for (idx, zone) in zones.iter().enumerate() {
        if zone.key.is_empty() {
            errors.push(format!("Zone #{} has an empty key", idx));
        }
        if !(zone.target_platelet_count > 0.0) {
            errors.push(format!(
                "Zone '{}': target platelet count {} must be positive",
                zone.key, zone.target_platelet_count
            ));
        }
        if !(zone.minimum_injection_volume_ml > 0.0) {
            errors.push(format!(
                "Zone '{}': minimum injection volume {} must be positive",
                zone.key, zone.minimum_injection_volume_ml
            ));
        }
        if zones[..idx].iter().any(|other| other.key == zone.key) {
            errors.push(format!("Zone '{}' is defined more than once", zone.key));
        }
    }

    if zones.is_empty() {
        errors.push("Zone table is empty".to_string());
    }

    errors
}
