//! Comparison runs
//!
//! Runs every candidate algorithm/approach over identical inputs and
//! picks a winner. Candidates always run, and results are returned, in
//! a fixed priority order, so the selection is stable no matter how the
//! caller enumerates them.

// Imports
use {
	crate::{
		alloc::{self, AllocationResult, FitAlgorithm, PartitionKind, Process},
		paging::{self, Mode, PagingResult, Segment, SegmentationResult},
		replacement::{self, Algorithm, ReplacementResult},
	},
	itertools::Itertools,
};

/// One allocation candidate's result
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AllocationCandidate {
	pub algorithm: FitAlgorithm,
	pub result:    AllocationResult,
}

/// Comparison of all continuous-allocation algorithms
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AllocationComparison {
	/// Results in candidate order: first-fit, best-fit, worst-fit
	pub results: Vec<AllocationCandidate>,

	/// Algorithm with the lowest total fragmentation (ties go to the
	/// higher utilization, then to the earlier candidate)
	pub best_algorithm: FitAlgorithm,
}

/// Compares first-fit, best-fit and worst-fit over identical inputs
pub fn compare_allocation(
	memory_size: u64,
	processes: &[Process],
	partition_type: PartitionKind,
) -> Result<AllocationComparison, anyhow::Error> {
	let results = FitAlgorithm::ALL
		.into_iter()
		.map(|algorithm| {
			let result = alloc::simulate(memory_size, processes, partition_type, algorithm)?;
			Ok(AllocationCandidate { algorithm, result })
		})
		.collect::<Result<Vec<_>, anyhow::Error>>()?;

	let total_fragmentation =
		|candidate: &AllocationCandidate| candidate.result.internal_fragmentation + candidate.result.external_fragmentation;

	let mut best_idx = 0;
	for idx in 1..results.len() {
		let better = match total_fragmentation(&results[idx]).cmp(&total_fragmentation(&results[best_idx])) {
			std::cmp::Ordering::Less => true,
			std::cmp::Ordering::Greater => false,
			std::cmp::Ordering::Equal =>
				results[idx].result.memory_utilization > results[best_idx].result.memory_utilization,
		};
		if better {
			best_idx = idx;
		}
	}
	let best_algorithm = results[best_idx].algorithm;
	tracing::debug!(?best_algorithm, "Selected best allocation algorithm");

	Ok(AllocationComparison {
		results,
		best_algorithm,
	})
}

/// Comparison of paging against segmentation
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PagingSegmentationComparison {
	pub paging:       PagingResult,
	pub segmentation: SegmentationResult,

	/// Approach with the higher memory utilization (ties go to paging)
	pub best_approach: Mode,
}

/// Compares paging against segmentation over the same memory
pub fn compare_paging_segmentation(
	memory_size: u64,
	process_size: u64,
	page_size: u64,
	segments: &[Segment],
) -> Result<PagingSegmentationComparison, anyhow::Error> {
	let paging = paging::simulate_paging(memory_size, process_size, page_size)?;
	let segmentation = paging::simulate_segmentation(memory_size, segments)?;

	let best_approach = match segmentation.memory_utilization > paging.memory_utilization {
		true => Mode::Segmentation,
		false => Mode::Paging,
	};
	tracing::debug!(?best_approach, "Selected best approach");

	Ok(PagingSegmentationComparison {
		paging,
		segmentation,
		best_approach,
	})
}

/// One replacement candidate's result
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReplacementCandidate {
	pub algorithm: Algorithm,
	pub result:    ReplacementResult,
}

/// Comparison of all page-replacement algorithms
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReplacementComparison {
	/// Results in candidate order: FIFO, LRU, LFU, Optimal
	pub results: Vec<ReplacementCandidate>,

	/// Algorithm with the fewest faults (ties go to the earlier candidate)
	pub best_algorithm: Algorithm,
}

/// Compares FIFO, LRU, LFU and Optimal over identical inputs
pub fn compare_replacement(
	reference_string: &[u64],
	frame_count: usize,
) -> Result<ReplacementComparison, anyhow::Error> {
	let results = Algorithm::ALL
		.into_iter()
		.map(|algorithm| {
			let result = replacement::simulate(algorithm, reference_string, frame_count)?;
			Ok(ReplacementCandidate { algorithm, result })
		})
		.collect::<Result<Vec<_>, anyhow::Error>>()?;

	let best_idx = results
		.iter()
		.position_min_by_key(|candidate| candidate.result.page_faults)
		.expect("Candidate list isn't empty");
	let best_algorithm = results[best_idx].algorithm;
	tracing::debug!(?best_algorithm, "Selected best replacement algorithm");

	Ok(ReplacementComparison {
		results,
		best_algorithm,
	})
}
