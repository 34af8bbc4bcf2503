// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FlexION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Numeric helpers shared by the analytics modules

/// Round to a fixed number of decimal places
///
/// # Examples
/// ```
/// use flexion_core::utils::round_to;
/// assert_eq!(round_to(5.004_9, 2), 5.0);
/// assert_eq!(round_to(2.345_1, 2), 2.35);
/// ```
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Arithmetic mean of a slice, None when empty
#[expect(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `part / whole * 100`, 0 when the whole is (nearly) zero
///
/// A negative whole (a period of negative prices) gives a negative
/// percentage for a positive part.
pub fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole.abs() < 1e-9 {
        0.0
    } else {
        part / whole * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert!((round_to(20.0, 2) - 20.0).abs() < f64::EPSILON);
        assert!((round_to(1.0 / 3.0, 2) - 0.33).abs() < 1e-12);
        assert!((round_to(-1.005_1, 2) - (-1.01)).abs() < 1e-12);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[10.0, 20.0, 30.0]), Some(20.0));
    }

    #[test]
    fn test_percentage_of_zero_mean() {
        assert!(percentage_of(5.0, 0.0).abs() < f64::EPSILON);
        assert!((percentage_of(5.0, 50.0) - 10.0).abs() < 1e-12);
        assert!(percentage_of(5.0, 1e-12).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_of_negative_mean() {
        assert!((percentage_of(5.0, -50.0) + 10.0).abs() < 1e-12);
    }
}
