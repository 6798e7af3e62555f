//! Rational timing helpers
//!
//! Positions inside a bar are computed as exact rationals and only rounded
//! when they become coordinates, so triplets and sixteenths decode without
//! floating-point drift.

use num_rational::Ratio;

/// Exact position in beats from the start of a bar
pub type Time = Ratio<i64>;

/// Decimal places kept for coordinates decoded from notation
pub const NOTATION_PRECISION: u32 = 2;

/// Decimal places kept for coordinates generated from recipes
pub const RECIPE_PRECISION: u32 = 3;

/// Helper to create Time from a ratio n/d
#[inline]
pub fn time(n: i64, d: i64) -> Time {
    Ratio::new(n, d)
}

/// Create Time from an integer (whole beats)
#[inline]
pub fn beats(n: i64) -> Time {
    Ratio::from_integer(n)
}

/// Convert rational to f64
#[inline]
pub fn to_f64(t: Time) -> f64 {
    *t.numer() as f64 / *t.denom() as f64
}

/// Convert f64 to approximate Time
/// Uses a fixed denominator for reasonable precision
pub fn from_f64(f: f64) -> Time {
    // 9600 is divisible by 2, 3, 4, 5, 6, 8, 12, 16, 24, 32 and 48
    let denom = 9600i64;
    let numer = (f * denom as f64).round() as i64;
    Ratio::new(numer, denom)
}

/// Round an exact time to `places` decimals, ties to even.
///
/// Returns the rounded value as a whole number of `10^-places` units.
fn round_units(t: Time, places: u32) -> i64 {
    let scaled = t * beats(10i64.pow(places));
    let floor = scaled.floor();
    let frac = scaled - floor;
    let base = floor.to_integer();
    let half = time(1, 2);
    if frac > half || (frac == half && base % 2 != 0) {
        base + 1
    } else {
        base
    }
}

/// Convert an exact time into a coordinate rounded to `places` decimals
pub fn to_coordinate(t: Time, places: u32) -> f64 {
    round_units(t, places) as f64 / 10f64.powi(places as i32)
}
