//! Structural and numerical constants for the relaxation.

/// Residual unbalance below which a joint counts as balanced.
///
/// Applies to `|Σ moment|` over a joint's ends, in the moment units of
/// the input (typically kN·m or ft·lb).
pub const TOLERANCE: f64 = 0.1;

/// Default tolerance for comparing two independently solved frames.
///
/// Must be at least [`TOLERANCE`]: two converged solutions may differ by
/// the residual each one is allowed to leave behind.
pub const TOLERANCE_CHECK: f64 = 0.2;

/// Fraction of an end's moment increment carried to the far end of the
/// member. 0.5 for prismatic members with a fixed far end.
pub const CARRYOVER_RATIO: f64 = 0.5;

/// Default pass bound before a run is declared divergent.
pub const DEFAULT_MAX_PASSES: u64 = 1_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_tolerance_covers_relaxation_tolerance() {
        assert!(TOLERANCE_CHECK >= TOLERANCE);
    }

    #[test]
    fn carryover_is_a_proper_fraction() {
        assert!(CARRYOVER_RATIO > 0.0 && CARRYOVER_RATIO < 1.0);
    }
}
