//! Classification of the final PRP concentration against the therapeutic window.

use crate::types::{
    Feedback, FeedbackKind, OPTIMAL_MAX_PLATELETS_PER_UL, OPTIMAL_MIN_PLATELETS_PER_UL,
};

/// Classify a final PRP concentration (platelets/µL)
///
/// Both window bounds are inclusive for `Success`.
pub fn classify(final_prp_concentration_per_ul: f64) -> Feedback {
    let millions = final_prp_concentration_per_ul / 1_000_000.0;
    let lead = format!(
        "Your initial PRP has a concentration of {:.2}M platelets/µL.",
        millions
    );

    let (kind, message) = if final_prp_concentration_per_ul < OPTIMAL_MIN_PLATELETS_PER_UL {
        (
            FeedbackKind::Warning,
            format!(
                "{} This is below the therapeutic window. Consider a higher concentration or alternative treatment.",
                lead
            ),
        )
    } else if final_prp_concentration_per_ul > OPTIMAL_MAX_PLATELETS_PER_UL {
        (
            FeedbackKind::Info,
            format!(
                "{} This is above the optimal window. The treatment plan adds the required PPP to dilute the final mixture to the target 1.5M/µL concentration.",
                lead
            ),
        )
    } else {
        (
            FeedbackKind::Success,
            format!(
                "{} This is within the optimal therapeutic window. Excellent!",
                lead
            ),
        )
    };

    tracing::debug!(
        "Concentration {:.0}/µL classified as {}",
        final_prp_concentration_per_ul,
        kind.as_str()
    );

    Feedback { kind, message }
}
