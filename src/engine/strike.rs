//! # engine::strike
//!
//! ATM strike selection: round the spot price to the nearest multiple of
//! the configured strike interval.
//!
//! Tie-break rule is **round-half-to-even** (`round_ties_even`), pinned and
//! covered by tests — a spot exactly between two strikes goes to the even
//! multiple, so 5002.5 with step 5 selects 5000, not 5005.

/// Nearest strike to `spot` on the `step` grid.
///
/// Returns `None` when the spot is not a usable price (NaN, infinite,
/// non-positive) or the step is non-positive. Pure and deterministic.
pub fn select(spot: f64, step: f64) -> Option<f64> {
    if !spot.is_finite() || spot <= 0.0 || step <= 0.0 {
        return None;
    }
    Some(step * (spot / step).round_ties_even())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_nearest_multiple() {
        assert_eq!(select(5007.0, 5.0), Some(5005.0));
        assert_eq!(select(5008.0, 5.0), Some(5010.0));
        assert_eq!(select(5000.0, 5.0), Some(5000.0));
        assert_eq!(select(4998.2, 5.0), Some(5000.0));
    }

    #[test]
    fn test_half_to_even_tie_break() {
        // 5002.5 / 5 = 1000.5 → even neighbour 1000 → 5000
        assert_eq!(select(5002.5, 5.0), Some(5000.0));
        // 5007.5 / 5 = 1001.5 → even neighbour 1002 → 5010
        assert_eq!(select(5007.5, 5.0), Some(5010.0));
    }

    #[test]
    fn test_invalid_inputs_yield_none() {
        assert_eq!(select(0.0, 5.0), None);
        assert_eq!(select(-12.0, 5.0), None);
        assert_eq!(select(f64::NAN, 5.0), None);
        assert_eq!(select(f64::INFINITY, 5.0), None);
        assert_eq!(select(5000.0, 0.0), None);
    }

    #[test]
    fn test_result_is_on_grid_and_within_half_step() {
        for i in 0..500 {
            let spot = 4000.0 + i as f64 * 7.3;
            let strike = select(spot, 5.0).unwrap();
            assert_eq!(strike % 5.0, 0.0, "strike {strike} off grid for spot {spot}");
            assert!(
                (strike - spot).abs() <= 2.5 + 1e-9,
                "strike {strike} too far from spot {spot}"
            );
        }
    }

    #[test]
    fn test_idempotent_on_its_own_output() {
        for spot in [4993.4, 5002.5, 5007.0, 6123.9] {
            let strike = select(spot, 5.0).unwrap();
            assert_eq!(select(strike, 5.0), Some(strike));
        }
    }
}
