//! Logical-to-physical address translation

// Imports
use std::fmt;

/// Page table entry.
///
/// `frame_number` is `Some` iff `valid`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PageTableEntry {
	pub page_number:  u64,
	pub frame_number: Option<usize>,
	pub valid:        bool,
	#[serde(default)]
	pub dirty:        bool,
	#[serde(default)]
	pub reference:    bool,
}

impl PageTableEntry {
	/// Creates an invalid (non-resident) entry for `page_number`
	pub fn invalid(page_number: u64) -> Self {
		Self {
			page_number,
			frame_number: None,
			valid: false,
			dirty: false,
			reference: false,
		}
	}

	/// Creates a resident entry for `page_number`, mapped to `frame_number`
	pub fn resident(page_number: u64, frame_number: usize) -> Self {
		Self {
			page_number,
			frame_number: Some(frame_number),
			valid: true,
			dirty: false,
			reference: false,
		}
	}
}

/// A successful address translation
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Translation {
	pub logical_address:  u64,
	pub page_number:      u64,
	pub offset:           u64,
	pub frame_number:     usize,
	pub physical_address: u64,

	/// Bit-level view of the translation.
	///
	/// Only present when the page size is an exact power of two.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub binary_breakdown: Option<BinaryBreakdown>,
}

/// Binary breakdown of a translation, for diagnostic display
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct BinaryBreakdown {
	pub logical_bits:  String,
	pub page_bits:     String,
	pub offset_bits:   String,
	pub frame_bits:    String,
	pub physical_bits: String,
}

/// A page fault.
///
/// This is a normal simulated outcome, not an engine failure, so it's
/// kept as a typed value rather than an `anyhow` error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageFault {
	/// The page that wasn't resident
	pub page_number: u64,
}

impl fmt::Display for PageFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Page fault: page {} is not in memory", self.page_number)
	}
}

impl std::error::Error for PageFault {}

/// Translates `logical_address` against `table`.
///
/// Fails with [`PageFault`] if the page is absent from the table or
/// not resident. `page_size` must be non-zero, the caller validates it.
pub fn translate(logical_address: u64, page_size: u64, table: &[PageTableEntry]) -> Result<Translation, PageFault> {
	let page_number = logical_address / page_size;
	let offset = logical_address % page_size;

	let frame_number = table
		.get(page_number as usize)
		.filter(|entry| entry.valid)
		.and_then(|entry| entry.frame_number)
		.ok_or(PageFault { page_number })?;

	let physical_address = frame_number as u64 * page_size + offset;

	Ok(Translation {
		logical_address,
		page_number,
		offset,
		frame_number,
		physical_address,
		binary_breakdown: self::binary_breakdown(
			logical_address,
			page_number,
			offset,
			frame_number,
			physical_address,
			page_size,
			table.len(),
		),
	})
}

/// Builds the binary breakdown for a translation.
///
/// Returns `None` when `page_size` isn't a power of two, since the
/// page-number/offset fields then don't fall on bit boundaries.
fn binary_breakdown(
	logical_address: u64,
	page_number: u64,
	offset: u64,
	frame_number: usize,
	physical_address: u64,
	page_size: u64,
	table_len: usize,
) -> Option<BinaryBreakdown> {
	if !page_size.is_power_of_two() {
		return None;
	}

	let offset_width = page_size.trailing_zeros() as usize;
	let page_width = self::bit_width(table_len.saturating_sub(1) as u64);
	let address_width = page_width + offset_width;

	Some(BinaryBreakdown {
		logical_bits:  format!("{logical_address:0address_width$b}"),
		page_bits:     format!("{page_number:0page_width$b}"),
		offset_bits:   format!("{offset:0offset_width$b}"),
		frame_bits:    format!("{frame_number:0page_width$b}"),
		physical_bits: format!("{physical_address:0address_width$b}"),
	})
}

/// Number of bits needed to represent `value` (at least 1)
fn bit_width(value: u64) -> usize {
	match value {
		0 => 1,
		_ => (u64::BITS - value.leading_zeros()) as usize,
	}
}
