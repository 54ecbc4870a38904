//! Continuous memory allocation

// Modules
pub mod block_list;

// Exports
pub use block_list::{BlockList, BlockState, FitAlgorithm, MemoryBlock};

// Imports
use {itertools::Itertools, osmemsim_util::round2, std::collections::HashSet};

/// A process to place in memory.
///
/// Input only, never mutated by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Process {
	pub id:   String,
	pub size: u64,
}

/// Partitioning scheme
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionKind {
	Fixed,
	Variable,
}

/// A successfully placed process
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AllocatedProcess {
	pub id:    String,
	pub size:  u64,
	pub start: u64,
	pub end:   u64,
}

/// Result of a continuous-allocation run
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct AllocationResult {
	pub algorithm:      FitAlgorithm,
	pub partition_type: PartitionKind,
	pub total_memory:   u64,

	/// Placed processes, in input order
	pub allocated: Vec<AllocatedProcess>,

	/// Processes that couldn't be placed, in input order.
	///
	/// A normal outcome, not an error.
	pub unallocated: Vec<Process>,

	pub internal_fragmentation: u64,
	pub external_fragmentation: u64,
	pub memory_utilization:     f64,

	/// Final block layout over `[0, total_memory)`
	pub memory_map: Vec<MemoryBlock>,
}

/// Simulates continuous allocation of `processes` into `memory_size` bytes.
///
/// # Errors
/// Fails on invalid configuration: non-positive memory size, empty
/// process list, non-positive process size, or duplicate process ids.
pub fn simulate(
	memory_size: u64,
	processes: &[Process],
	partition_type: PartitionKind,
	algorithm: FitAlgorithm,
) -> Result<AllocationResult, anyhow::Error> {
	self::validate(memory_size, processes)?;

	match partition_type {
		PartitionKind::Fixed => Ok(self::simulate_fixed(memory_size, processes, algorithm)),
		PartitionKind::Variable => Ok(self::simulate_variable(memory_size, processes, algorithm)),
	}
}

/// Validates an allocation request
fn validate(memory_size: u64, processes: &[Process]) -> Result<(), anyhow::Error> {
	anyhow::ensure!(memory_size > 0, "Memory size must be positive");
	anyhow::ensure!(!processes.is_empty(), "Process list must not be empty");
	for process in processes {
		anyhow::ensure!(process.size > 0, "Process {:?} must have a positive size", process.id);
	}

	let mut ids = HashSet::new();
	for process in processes {
		anyhow::ensure!(ids.insert(&process.id), "Duplicate process id {:?}", process.id);
	}

	Ok(())
}

/// Variable partitioning: a free-block list, split on each allocation
fn simulate_variable(memory_size: u64, processes: &[Process], algorithm: FitAlgorithm) -> AllocationResult {
	let mut blocks = BlockList::new(memory_size);
	let mut allocated = Vec::with_capacity(processes.len());
	let mut unallocated = Vec::new();

	for process in processes {
		match blocks.select_free(process.size, algorithm) {
			Some(block_idx) => {
				let (start, end) = blocks.allocate(block_idx, process.size, &process.id);
				tracing::trace!(id = %process.id, size = process.size, start, end, "Allocated process");
				allocated.push(AllocatedProcess {
					id: process.id.clone(),
					size: process.size,
					start,
					end,
				});
			},
			None => {
				tracing::trace!(id = %process.id, size = process.size, "No block fits process");
				unallocated.push(process.clone());
			},
		}
	}

	let allocated_bytes = allocated.iter().map(|process| process.size).sum::<u64>();

	AllocationResult {
		algorithm,
		partition_type: PartitionKind::Variable,
		total_memory: memory_size,
		allocated,
		unallocated,
		internal_fragmentation: 0,
		external_fragmentation: blocks.free_bytes(),
		memory_utilization: round2(100.0 * allocated_bytes as f64 / memory_size as f64),
		memory_map: blocks.into_blocks(),
	}
}

/// Fixed partitioning: memory pre-divided into `processes.len()` equal partitions
fn simulate_fixed(memory_size: u64, processes: &[Process], algorithm: FitAlgorithm) -> AllocationResult {
	let num_partitions = processes.len() as u64;
	let partition_size = memory_size / num_partitions;

	// One owner slot per partition. All partitions are the same size, so
	// best/worst-fit leftovers tie everywhere and every policy resolves
	// to the earliest unused partition that fits.
	let mut partitions: Vec<Option<&Process>> = vec![None; num_partitions as usize];
	let mut allocated = Vec::new();
	let mut unallocated = Vec::new();
	let mut internal_fragmentation = 0;

	for process in processes {
		let slot = partitions
			.iter()
			.position(|owner| owner.is_none() && partition_size >= process.size);
		match slot {
			Some(slot) => {
				partitions[slot] = Some(process);
				let start = slot as u64 * partition_size;
				tracing::trace!(id = %process.id, size = process.size, partition = slot, "Placed in partition");
				allocated.push(AllocatedProcess {
					id: process.id.clone(),
					size: process.size,
					start,
					end: start + process.size,
				});
				internal_fragmentation += partition_size - process.size;
			},
			None => {
				tracing::trace!(id = %process.id, size = process.size, "Process fits no partition");
				unallocated.push(process.clone());
			},
		}
	}

	// Whole unused partitions, plus the divider remainder past the last
	// partition, count as external fragmentation.
	let unused_partitions = partitions.iter().filter(|owner| owner.is_none()).count() as u64;
	let remainder = memory_size - num_partitions * partition_size;
	let external_fragmentation = unused_partitions * partition_size + remainder;

	let allocated_bytes = allocated.iter().map(|process| process.size).sum::<u64>();

	let memory_map = partitions
		.iter()
		.enumerate()
		.map(|(idx, owner)| {
			let start = idx as u64 * partition_size;
			MemoryBlock {
				start,
				end: start + partition_size,
				state: match owner {
					Some(_) => BlockState::Allocated,
					None => BlockState::Free,
				},
				owner: owner.as_ref().map(|process| process.id.clone()),
			}
		})
		.chain((remainder > 0).then(|| MemoryBlock {
			start: num_partitions * partition_size,
			end:   memory_size,
			state: BlockState::Free,
			owner: None,
		}))
		.collect_vec();

	AllocationResult {
		algorithm,
		partition_type: PartitionKind::Fixed,
		total_memory: memory_size,
		allocated,
		unallocated,
		internal_fragmentation,
		external_fragmentation,
		memory_utilization: round2(100.0 * allocated_bytes as f64 / memory_size as f64),
		memory_map,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn processes(sizes: &[u64]) -> Vec<Process> {
		sizes
			.iter()
			.enumerate()
			.map(|(idx, &size)| Process {
				id: format!("P{}", idx + 1),
				size,
			})
			.collect()
	}

	#[test]
	fn variable_first_fit_reference_scenario() {
		let result = simulate(
			1000,
			&processes(&[212, 417, 112, 426]),
			PartitionKind::Variable,
			FitAlgorithm::FirstFit,
		)
		.expect("Valid config");

		assert_eq!(result.allocated, vec![
			AllocatedProcess {
				id:    "P1".to_owned(),
				size:  212,
				start: 0,
				end:   212,
			},
			AllocatedProcess {
				id:    "P2".to_owned(),
				size:  417,
				start: 212,
				end:   629,
			},
			AllocatedProcess {
				id:    "P3".to_owned(),
				size:  112,
				start: 629,
				end:   741,
			},
		]);
		assert_eq!(result.unallocated.len(), 1);
		assert_eq!(result.unallocated[0].id, "P4");
		assert_eq!(result.internal_fragmentation, 0);
		assert_eq!(result.external_fragmentation, 259);
		assert_eq!(result.memory_utilization, 74.1);
	}

	#[test]
	fn fixed_partitions_account_for_all_memory() {
		let result = simulate(
			1000,
			&processes(&[200, 150, 500]),
			PartitionKind::Fixed,
			FitAlgorithm::FirstFit,
		)
		.expect("Valid config");

		// 3 partitions of 333 bytes; P3 (500) fits nowhere
		assert_eq!(result.allocated.len(), 2);
		assert_eq!(result.unallocated.len(), 1);
		assert_eq!(result.internal_fragmentation, (333 - 200) + (333 - 150));
		// 1 unused partition + 1 byte of divider remainder
		assert_eq!(result.external_fragmentation, 333 + 1);

		let allocated_bytes = result.allocated.iter().map(|p| p.size).sum::<u64>();
		assert_eq!(
			allocated_bytes + result.internal_fragmentation + result.external_fragmentation,
			1000
		);
	}

	#[test]
	fn memory_map_covers_memory() {
		for partition_type in [PartitionKind::Fixed, PartitionKind::Variable] {
			let result = simulate(
				1000,
				&processes(&[100, 300, 250]),
				partition_type,
				FitAlgorithm::BestFit,
			)
			.expect("Valid config");

			let mut expected_start = 0;
			for block in &result.memory_map {
				assert_eq!(block.start, expected_start, "Gap or overlap in {partition_type:?} map");
				expected_start = block.end;
			}
			assert_eq!(expected_start, 1000);
		}
	}

	#[test]
	fn rejects_invalid_config() {
		assert!(simulate(0, &processes(&[10]), PartitionKind::Variable, FitAlgorithm::FirstFit).is_err());
		assert!(simulate(100, &[], PartitionKind::Variable, FitAlgorithm::FirstFit).is_err());
		assert!(simulate(100, &processes(&[0]), PartitionKind::Variable, FitAlgorithm::FirstFit).is_err());

		let duplicated = vec![
			Process {
				id:   "P1".to_owned(),
				size: 10,
			},
			Process {
				id:   "P1".to_owned(),
				size: 20,
			},
		];
		assert!(simulate(100, &duplicated, PartitionKind::Variable, FitAlgorithm::FirstFit).is_err());
	}
}
