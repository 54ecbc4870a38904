//! Paging and segmentation

// Imports
use {
	crate::{
		alloc::{BlockList, FitAlgorithm},
		translate::PageTableEntry,
	},
	osmemsim_util::round2,
	std::fmt,
};

/// Simulation mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
	Paging,
	Segmentation,
}

/// A segment to place in memory
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Segment {
	pub name: String,
	pub size: u64,
}

/// Segment table entry.
///
/// `base` and `end` are `Some` iff `allocated`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SegmentTableEntry {
	pub index:     usize,
	pub name:      String,
	pub base:      Option<u64>,
	pub limit:     u64,
	pub end:       Option<u64>,
	pub allocated: bool,
}

/// Result of a paging-mode run
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PagingResult {
	pub mode:         Mode,
	pub memory_size:  u64,
	pub process_size: u64,
	pub page_size:    u64,

	pub num_pages:   u64,
	pub num_frames:  u64,
	pub frames_used: u64,

	/// One entry per logical page of the process, in page order
	pub page_table: Vec<PageTableEntry>,

	pub internal_fragmentation: u64,
	pub external_fragmentation: u64,
	pub memory_utilization:     f64,

	/// Percentage of pages that aren't resident
	pub page_fault_probability: f64,
	pub access_efficiency:      f64,
}

/// Result of a segmentation-mode run
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SegmentationResult {
	pub mode:        Mode,
	pub memory_size: u64,

	pub total_segments:     usize,
	pub allocated_segments: usize,

	/// One entry per input segment, in input order
	pub segment_table: Vec<SegmentTableEntry>,

	pub internal_fragmentation: u64,
	pub external_fragmentation: u64,
	pub memory_utilization:     f64,
	pub access_efficiency:      f64,

	/// Size of the segment table itself, at 8 bytes per entry
	pub segment_overhead: u64,
}

/// Simulates fixed-size paging of a single process.
///
/// Pages are assigned to frames in page order. If the process has more
/// pages than memory has frames, the excess pages stay non-resident,
/// which is a normal outcome.
///
/// # Errors
/// Fails on non-positive memory, process or page size.
pub fn simulate_paging(memory_size: u64, process_size: u64, page_size: u64) -> Result<PagingResult, anyhow::Error> {
	anyhow::ensure!(memory_size > 0, "Memory size must be positive");
	anyhow::ensure!(process_size > 0, "Process size must be positive");
	anyhow::ensure!(page_size > 0, "Page size must be positive");

	let num_pages = process_size.div_ceil(page_size);
	let num_frames = memory_size / page_size;
	let frames_used = num_pages.min(num_frames);

	let page_table = (0..num_pages)
		.map(|page_number| match page_number < frames_used {
			true => PageTableEntry::resident(page_number, page_number as usize),
			false => PageTableEntry::invalid(page_number),
		})
		.collect();

	// Waste only exists in the last resident page
	let resident_bytes = process_size.min(frames_used * page_size);
	let internal_fragmentation = frames_used * page_size - resident_bytes;

	let page_fault_probability = 100.0 * (num_pages - frames_used) as f64 / num_pages as f64;

	Ok(PagingResult {
		mode: Mode::Paging,
		memory_size,
		process_size,
		page_size,
		num_pages,
		num_frames,
		frames_used,
		page_table,
		internal_fragmentation,
		external_fragmentation: 0,
		memory_utilization: round2(100.0 * resident_bytes as f64 / memory_size as f64),
		page_fault_probability: round2(page_fault_probability),
		access_efficiency: round2(100.0 - page_fault_probability),
	})
}

/// Simulates variable-size segmentation.
///
/// Segments are placed first-fit over a free-block list; segments that
/// fit no free block are left unallocated.
///
/// # Errors
/// Fails on non-positive memory size, empty segment list, or
/// non-positive segment size.
pub fn simulate_segmentation(memory_size: u64, segments: &[Segment]) -> Result<SegmentationResult, anyhow::Error> {
	anyhow::ensure!(memory_size > 0, "Memory size must be positive");
	anyhow::ensure!(!segments.is_empty(), "Segment list must not be empty");
	for segment in segments {
		anyhow::ensure!(segment.size > 0, "Segment {:?} must have a positive size", segment.name);
	}

	let mut blocks = BlockList::new(memory_size);
	let mut segment_table = Vec::with_capacity(segments.len());
	let mut allocated_segments = 0;
	let mut allocated_bytes = 0;

	for (index, segment) in segments.iter().enumerate() {
		let entry = match blocks.select_free(segment.size, FitAlgorithm::FirstFit) {
			Some(block_idx) => {
				let (base, end) = blocks.allocate(block_idx, segment.size, &segment.name);
				tracing::trace!(name = %segment.name, size = segment.size, base, "Allocated segment");
				allocated_segments += 1;
				allocated_bytes += segment.size;
				SegmentTableEntry {
					index,
					name: segment.name.clone(),
					base: Some(base),
					limit: segment.size,
					end: Some(end),
					allocated: true,
				}
			},
			None => {
				tracing::trace!(name = %segment.name, size = segment.size, "No block fits segment");
				SegmentTableEntry {
					index,
					name: segment.name.clone(),
					base: None,
					limit: segment.size,
					end: None,
					allocated: false,
				}
			},
		};
		segment_table.push(entry);
	}

	Ok(SegmentationResult {
		mode: Mode::Segmentation,
		memory_size,
		total_segments: segments.len(),
		allocated_segments,
		internal_fragmentation: 0,
		external_fragmentation: blocks.free_bytes(),
		memory_utilization: round2(100.0 * allocated_bytes as f64 / memory_size as f64),
		access_efficiency: round2(100.0 * allocated_segments as f64 / segments.len() as f64),
		segment_overhead: 8 * segment_table.len() as u64,
		segment_table,
	})
}

/// A successful segment-relative translation
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SegmentTranslation {
	pub segment_number:   usize,
	pub offset:           u64,
	pub base:             u64,
	pub limit:            u64,
	pub physical_address: u64,
}

/// A failed segment-relative translation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentFault {
	/// No such segment in the table
	InvalidSegment { segment_number: usize },

	/// Segment exists but isn't in memory
	NotAllocated { segment_number: usize },

	/// Offset is at or past the segment limit
	LimitExceeded { offset: u64, limit: u64 },
}

impl fmt::Display for SegmentFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidSegment { segment_number } => write!(f, "Invalid segment number {segment_number}"),
			Self::NotAllocated { segment_number } => write!(f, "Segment {segment_number} is not allocated"),
			Self::LimitExceeded { offset, limit } =>
				write!(f, "Segmentation fault: offset {offset} exceeds limit {limit}"),
		}
	}
}

impl std::error::Error for SegmentFault {}

/// Translates a `(segment, offset)` pair against `table`
pub fn translate_segment(
	segment_number: usize,
	offset: u64,
	table: &[SegmentTableEntry],
) -> Result<SegmentTranslation, SegmentFault> {
	let entry = table
		.get(segment_number)
		.ok_or(SegmentFault::InvalidSegment { segment_number })?;
	let base = entry.base.ok_or(SegmentFault::NotAllocated { segment_number })?;

	if offset >= entry.limit {
		return Err(SegmentFault::LimitExceeded {
			offset,
			limit: entry.limit,
		});
	}

	Ok(SegmentTranslation {
		segment_number,
		offset,
		base,
		limit: entry.limit,
		physical_address: base + offset,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn paging_process_fits_memory() {
		let result = simulate_paging(4096, 1000, 256).expect("Valid config");
		assert_eq!(result.num_pages, 4);
		assert_eq!(result.num_frames, 16);
		assert_eq!(result.frames_used, 4);
		assert_eq!(result.page_table.len(), 4);
		assert!(result.page_table.iter().all(|entry| entry.valid));
		// Last page holds 1000 - 3*256 = 232 bytes
		assert_eq!(result.internal_fragmentation, 24);
		assert_eq!(result.access_efficiency, 100.0);
	}

	#[test]
	fn paging_process_too_large_for_memory() {
		let result = simulate_paging(1024, 2048, 256).expect("Valid config");
		assert_eq!(result.num_pages, 8);
		assert_eq!(result.num_frames, 4);
		assert_eq!(result.frames_used, 4);
		assert_eq!(result.page_table.iter().filter(|entry| entry.valid).count(), 4);
		assert_eq!(result.page_table[4].frame_number, None);
		assert_eq!(result.internal_fragmentation, 0);
		assert_eq!(result.page_fault_probability, 50.0);
		assert_eq!(result.access_efficiency, 50.0);
	}

	#[test]
	fn paging_frames_assigned_in_page_order() {
		let result = simulate_paging(4096, 1024, 256).expect("Valid config");
		for (page_number, entry) in result.page_table.iter().enumerate() {
			assert_eq!(entry.frame_number, Some(page_number));
		}
	}

	#[test]
	fn segmentation_preserves_input_order() {
		let segments = vec![
			Segment {
				name: "Code".to_owned(),
				size: 512,
			},
			Segment {
				name: "Data".to_owned(),
				size: 768,
			},
			Segment {
				name: "Heap".to_owned(),
				size: 1024,
			},
		];
		let result = simulate_segmentation(1500, &segments).expect("Valid config");

		assert_eq!(result.total_segments, 3);
		assert_eq!(result.allocated_segments, 2);
		assert_eq!(result.segment_table[0].base, Some(0));
		assert_eq!(result.segment_table[1].base, Some(512));
		assert_eq!(result.segment_table[2].base, None);
		assert!(!result.segment_table[2].allocated);
		assert_eq!(result.external_fragmentation, 1500 - 512 - 768);
		assert_eq!(result.access_efficiency, round2(100.0 * 2.0 / 3.0));
	}

	#[test]
	fn segment_translation() {
		let segments = vec![Segment {
			name: "Code".to_owned(),
			size: 100,
		}];
		let result = simulate_segmentation(1000, &segments).expect("Valid config");

		let translation = translate_segment(0, 40, &result.segment_table).expect("In bounds");
		assert_eq!(translation.physical_address, 40);

		assert_eq!(translate_segment(0, 100, &result.segment_table), Err(SegmentFault::LimitExceeded {
			offset: 100,
			limit:  100,
		}));
		assert_eq!(
			translate_segment(5, 0, &result.segment_table),
			Err(SegmentFault::InvalidSegment { segment_number: 5 })
		);
	}

	#[test]
	fn rejects_invalid_config() {
		assert!(simulate_paging(0, 100, 10).is_err());
		assert!(simulate_paging(100, 0, 10).is_err());
		assert!(simulate_paging(100, 100, 0).is_err());
		assert!(simulate_segmentation(100, &[]).is_err());
	}
}
