//! Utilities

// Modules
pub mod logger;

// Imports
use std::fmt;

/// Rounds a percentage (or any float) to 2 decimal places.
///
/// Results carry percentages rounded for display stability, while
/// all intermediate computation stays unrounded.
#[must_use]
pub fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}

/// [`fmt::Display`] helper for byte sizes in human-readable form
#[derive(Clone, Copy, Debug)]
pub struct BytesDisplay(pub u64);

impl fmt::Display for BytesDisplay {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];

		let mut value = self.0 as f64;
		let mut unit_idx = 0;
		while value >= 1024.0 && unit_idx + 1 < UNITS.len() {
			value /= 1024.0;
			unit_idx += 1;
		}

		match unit_idx {
			0 => write!(f, "{} {}", self.0, UNITS[unit_idx]),
			_ => write!(f, "{:.2} {}", value, UNITS[unit_idx]),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round2_truncates_to_two_places() {
		assert_eq!(round2(74.099_999), 74.1);
		assert_eq!(round2(25.0), 25.0);
		assert_eq!(round2(33.333_333), 33.33);
	}

	#[test]
	fn bytes_display_picks_unit() {
		assert_eq!(BytesDisplay(512).to_string(), "512 B");
		assert_eq!(BytesDisplay(2048).to_string(), "2.00 KiB");
		assert_eq!(BytesDisplay(3 * 1024 * 1024).to_string(), "3.00 MiB");
	}
}
