//! Sample workload generation

// Imports
use {
	crate::{
		alloc::Process,
		paging::Segment,
		virtual_mem::{Access, AccessKind},
	},
	rand::Rng,
};

/// Typical segment layout of a process image
const SEGMENT_NAMES: [&str; 6] = ["Code", "Data", "Stack", "Heap", "Shared", "Library"];

/// Generates `count` processes with sizes in `min_size..=max_size`
pub fn sample_processes(rng: &mut impl Rng, count: usize, min_size: u64, max_size: u64) -> Vec<Process> {
	(0..count)
		.map(|idx| Process {
			id:   format!("P{}", idx + 1),
			size: rng.gen_range(min_size..=max_size),
		})
		.collect()
}

/// Generates up to 6 named segments with sizes in `min_size..=max_size`
pub fn sample_segments(rng: &mut impl Rng, count: usize, min_size: u64, max_size: u64) -> Vec<Segment> {
	SEGMENT_NAMES
		.iter()
		.take(count)
		.map(|&name| Segment {
			name: name.to_owned(),
			size: rng.gen_range(min_size..=max_size),
		})
		.collect()
}

/// Generates a reference string of `length` pages in `0..=max_page`
pub fn sample_reference_string(rng: &mut impl Rng, length: usize, max_page: u64) -> Vec<u64> {
	(0..length).map(|_| rng.gen_range(0..=max_page)).collect()
}

/// Generates `count` read/write accesses over addresses in `0..max_address`
pub fn sample_access_pattern(rng: &mut impl Rng, count: usize, max_address: u64) -> Vec<Access> {
	(0..count)
		.map(|_| Access {
			address: rng.gen_range(0..max_address),
			kind:    match rng.gen_bool(0.5) {
				true => AccessKind::Read,
				false => AccessKind::Write,
			},
		})
		.collect()
}
