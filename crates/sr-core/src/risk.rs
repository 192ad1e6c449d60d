//! Risk model: pure functions shared by incident ingestion and route costing.
//!
//! # Units
//!
//! Risk is a dimensionless score in `[MIN_RISK, MAX_RISK]`.  The distance
//! term of [`composite_cost`] is expressed in 100 m units and capped at
//! [`DISTANCE_TERM_CAP`], so a single long edge contributes at most as much
//! as a maximally risky one.

use crate::{CoreError, CoreResult};

pub const MIN_RISK: f64 = 0.0;
pub const MAX_RISK: f64 = 10.0;

pub const MIN_SEVERITY: i32 = 1;
pub const MAX_SEVERITY: i32 = 10;

/// Metres per unit of the cost function's distance term.
pub const DISTANCE_UNIT_M: f64 = 100.0;

/// Upper bound of the distance term for a single edge.
pub const DISTANCE_TERM_CAP: f64 = 10.0;

/// Risk added to an edge by one incident of the given severity.
///
/// Severity 1 → +0.5, severity 10 → +5.0.
///
/// # Errors
///
/// [`CoreError::InvalidSeverity`] if `severity` is outside `[1, 10]`.
pub fn risk_increment(severity: i32) -> CoreResult<f64> {
    if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&severity) {
        return Err(CoreError::InvalidSeverity(severity));
    }
    Ok(f64::from(severity) / 10.0 * 5.0)
}

/// Clamp `risk` into `[MIN_RISK, MAX_RISK]`.  NaN maps to `MIN_RISK`.
#[inline]
pub fn clamp_risk(risk: f64) -> f64 {
    if risk.is_nan() {
        return MIN_RISK;
    }
    risk.clamp(MIN_RISK, MAX_RISK)
}

/// Normalized distance term of the cost function for an edge of
/// `distance_m` metres.
#[inline]
pub fn distance_term(distance_m: f64) -> f64 {
    (distance_m / DISTANCE_UNIT_M).min(DISTANCE_TERM_CAP)
}

// ── CostWeights ───────────────────────────────────────────────────────────────

/// The `(alpha, beta)` trade-off between distance and risk.
///
/// The core accepts any finite non-negative pair.  Named safety profiles
/// always sum to 1; costs are only comparable between routes computed with
/// the same weights.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostWeights {
    pub alpha: f64,
    pub beta: f64,
}

impl CostWeights {
    /// Validate and construct a weight pair.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidWeights`] if either weight is negative or not
    /// finite.
    pub fn new(alpha: f64, beta: f64) -> CoreResult<Self> {
        let ok = |w: f64| w.is_finite() && w >= 0.0;
        if !ok(alpha) || !ok(beta) {
            return Err(CoreError::InvalidWeights { alpha, beta });
        }
        Ok(Self { alpha, beta })
    }

    /// `true` if `alpha + beta` is within `tolerance` of 1.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.alpha + self.beta - 1.0).abs() < tolerance
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self { alpha: 0.5, beta: 0.5 }
    }
}

/// Cost of traversing one edge:
/// `alpha * min(distance_m / 100, 10) + beta * risk`.
#[inline]
pub fn composite_cost(distance_m: f64, risk: f64, weights: CostWeights) -> f64 {
    weights.alpha * distance_term(distance_m) + weights.beta * risk
}
