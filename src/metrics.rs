// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pure metric computations over tracking data.
//!
//! These functions are deterministic and take no dependencies on the
//! database or session state, so they are unit-testable in isolation.

/// Fixed height used for BMI, in meters.
pub const STANDARD_HEIGHT_M: f64 = 1.65;

/// Weekly dose during the titration phase, in milligrams.
pub const STARTING_DOSE_MG: f64 = 2.5;

/// Weekly dose after titration, in milligrams.
pub const MAINTENANCE_DOSE_MG: f64 = 5.0;

/// Number of weeks on the starting dose.
pub const TITRATION_WEEKS: u32 = 4;

/// Dose for a given week. Weeks 1-4 use the starting dose, week 5
/// onward the maintenance dose. Callers guarantee `week >= 1`.
pub fn dose_for(week: u32) -> f64 {
    if week <= TITRATION_WEEKS {
        STARTING_DOSE_MG
    } else {
        MAINTENANCE_DOSE_MG
    }
}

/// BMI for a weight at the standard height, rounded to 2 decimals.
///
/// Returns `None` if the weight is not a positive finite number;
/// callers validate input before persisting anything derived from it.
pub fn bmi_for(weight_kg: f64) -> Option<f64> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return None;
    }
    Some(round2(weight_kg / (STANDARD_HEIGHT_M * STANDARD_HEIGHT_M)))
}

/// Total weight lost since the first record, floored at zero and
/// rounded to 1 decimal.
pub fn total_lost_for(initial_weight_kg: f64, current_weight_kg: f64) -> f64 {
    round1(initial_weight_kg - current_weight_kg).max(0.0)
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 1 decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
