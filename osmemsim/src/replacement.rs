//! Page replacement

// Imports
use {
	itertools::Itertools,
	osmemsim_util::round2,
	std::{cmp::Reverse, time::Instant},
};

/// Page replacement algorithm
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
	Fifo,
	Lru,
	Lfu,
	Optimal,
}

impl Algorithm {
	/// All algorithms, in candidate priority order
	pub const ALL: [Self; 4] = [Self::Fifo, Self::Lru, Self::Lfu, Self::Optimal];
}

/// One step of the simulation trace
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Step {
	/// Referenced page
	pub page: u64,

	/// Resident pages after this step, in frame order
	pub frames: Vec<u64>,

	pub fault: bool,
}

/// Result of a page-replacement run
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReplacementResult {
	pub algorithm:   Algorithm,
	pub frame_count: usize,

	pub total_references: usize,
	pub page_hits:        usize,
	pub page_faults:      usize,
	pub hit_ratio:        f64,
	pub fault_ratio:      f64,

	/// Wall-clock run time, in microseconds.
	///
	/// Diagnostic only, not reproducible across runs.
	pub execution_time: f64,

	/// Per-step trace
	pub page_sequence: Vec<Step>,

	/// Resident pages after the last step
	pub final_frames: Vec<u64>,
}

/// A resident page plus the replacement metadata attached to it.
///
/// Metadata lives only while the page is resident; it's discarded on
/// eviction (notably, LFU counts restart at 1 on a re-load).
#[derive(Clone, Copy, Debug)]
struct FrameSlot {
	page: u64,

	/// Load sequence number (FIFO order, LFU/Optimal tie-break)
	loaded_seq: usize,

	/// Step index of the most recent access (LRU)
	last_used: usize,

	/// Accesses since load (LFU)
	access_count: usize,
}

/// Runs `algorithm` over `reference_string` with `frame_count` frames.
///
/// # Errors
/// Fails if `frame_count` is zero. An empty reference string is fine
/// and yields all-zero metrics.
pub fn simulate(
	algorithm: Algorithm,
	reference_string: &[u64],
	frame_count: usize,
) -> Result<ReplacementResult, anyhow::Error> {
	anyhow::ensure!(frame_count >= 1, "Frame count must be at least 1");

	let start_time = Instant::now();

	let mut slots: Vec<FrameSlot> = Vec::with_capacity(frame_count);
	let mut page_sequence = Vec::with_capacity(reference_string.len());
	let mut page_faults = 0;
	let mut loads = 0;

	for (step_idx, &page) in reference_string.iter().enumerate() {
		let fault = match slots.iter_mut().find(|slot| slot.page == page) {
			// Hit: FIFO/Optimal change no metadata
			Some(slot) => {
				match algorithm {
					Algorithm::Lru => slot.last_used = step_idx,
					Algorithm::Lfu => slot.access_count += 1,
					Algorithm::Fifo | Algorithm::Optimal => (),
				}
				false
			},

			// Fault: load into a free slot, or evict the victim's slot
			None => {
				page_faults += 1;
				let new_slot = FrameSlot {
					page,
					loaded_seq: loads,
					last_used: step_idx,
					access_count: 1,
				};
				loads += 1;

				if slots.len() < frame_count {
					slots.push(new_slot);
				} else {
					let victim_idx = self::victim(algorithm, &slots, reference_string, step_idx);
					tracing::trace!(victim = slots[victim_idx].page, page, "Evicting page");
					slots[victim_idx] = new_slot;
				}
				true
			},
		};

		page_sequence.push(Step {
			page,
			frames: slots.iter().map(|slot| slot.page).collect(),
			fault,
		});
	}

	let total_references = reference_string.len();
	let page_hits = total_references - page_faults;
	let hit_ratio = match total_references {
		0 => 0.0,
		_ => 100.0 * page_hits as f64 / total_references as f64,
	};
	let fault_ratio = match total_references {
		0 => 0.0,
		_ => 100.0 - hit_ratio,
	};

	Ok(ReplacementResult {
		algorithm,
		frame_count,
		total_references,
		page_hits,
		page_faults,
		hit_ratio: round2(hit_ratio),
		fault_ratio: round2(fault_ratio),
		execution_time: round2(start_time.elapsed().as_secs_f64() * 1_000_000.0),
		final_frames: slots.iter().map(|slot| slot.page).collect(),
		page_sequence,
	})
}

/// Picks the slot to evict. All slots are occupied.
///
/// Every policy breaks ties towards the earliest-loaded page, which
/// keeps the choice deterministic.
fn victim(algorithm: Algorithm, slots: &[FrameSlot], reference_string: &[u64], step_idx: usize) -> usize {
	match algorithm {
		// Earliest inserted
		Algorithm::Fifo => slots
			.iter()
			.position_min_by_key(|slot| slot.loaded_seq)
			.expect("Slots aren't empty"),

		// Least recently used
		Algorithm::Lru => slots
			.iter()
			.position_min_by_key(|slot| slot.last_used)
			.expect("Slots aren't empty"),

		// Smallest access count
		Algorithm::Lfu => slots
			.iter()
			.position_min_by_key(|slot| (slot.access_count, slot.loaded_seq))
			.expect("Slots aren't empty"),

		// Farthest next use in the remaining string; never used again
		// counts as farthest of all
		Algorithm::Optimal => {
			let remaining = &reference_string[step_idx + 1..];
			slots
				.iter()
				.position_min_by_key(|slot| {
					let next_use = remaining
						.iter()
						.position(|&page| page == slot.page)
						.unwrap_or(usize::MAX);
					(Reverse(next_use), slot.loaded_seq)
				})
				.expect("Slots aren't empty")
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// The classic Belady reference string
	const REFERENCE: [u64; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];

	#[test]
	fn fifo_reference_scenario() {
		let result = simulate(Algorithm::Fifo, &REFERENCE, 3).expect("Valid config");
		assert_eq!(result.page_faults, 9);
		assert_eq!(result.page_hits, 3);
		assert_eq!(result.hit_ratio, 25.0);
		assert_eq!(result.fault_ratio, 75.0);
		assert_eq!(result.page_sequence.len(), 12);
	}

	#[test]
	fn lru_counts() {
		let result = simulate(Algorithm::Lru, &REFERENCE, 3).expect("Valid config");
		assert_eq!(result.page_faults, 10);
		assert_eq!(result.page_hits, 2);
	}

	#[test]
	fn optimal_counts() {
		let result = simulate(Algorithm::Optimal, &REFERENCE, 3).expect("Valid config");
		assert_eq!(result.page_faults, 7);
		assert_eq!(result.page_hits, 5);
	}

	#[test]
	fn optimal_is_minimal() {
		let optimal = simulate(Algorithm::Optimal, &REFERENCE, 3).expect("Valid config");
		for algorithm in [Algorithm::Fifo, Algorithm::Lru, Algorithm::Lfu] {
			let other = simulate(algorithm, &REFERENCE, 3).expect("Valid config");
			assert!(
				optimal.page_faults <= other.page_faults,
				"Optimal beaten by {algorithm:?}"
			);
		}
	}

	#[test]
	fn lfu_count_restarts_on_reload() {
		// Page 2 is loaded, evicted, and reloaded. After the reload its
		// count is 1 again, so the final reference evicts 2, not 1.
		let result = simulate(Algorithm::Lfu, &[1, 1, 2, 3, 2, 9], 2).expect("Valid config");
		assert_eq!(result.page_faults, 5);
		assert_eq!(result.final_frames, vec![1, 9]);
	}

	#[test]
	fn lfu_ties_evict_earliest_loaded() {
		// All counts equal; 1 was loaded first
		let result = simulate(Algorithm::Lfu, &[1, 2, 3], 2).expect("Valid config");
		assert_eq!(result.final_frames, vec![3, 2]);
	}

	#[test]
	fn trace_snapshots_follow_each_step() {
		let result = simulate(Algorithm::Fifo, &[1, 2, 1, 3], 2).expect("Valid config");
		assert_eq!(result.page_sequence[0].frames, vec![1]);
		assert_eq!(result.page_sequence[1].frames, vec![1, 2]);
		assert!(!result.page_sequence[2].fault);
		// 1 evicted in place, 3 takes its slot
		assert_eq!(result.page_sequence[3].frames, vec![3, 2]);
		assert_eq!(result.final_frames, vec![3, 2]);
	}

	#[test]
	fn empty_reference_string_yields_zeroes() {
		let result = simulate(Algorithm::Lru, &[], 3).expect("Valid config");
		assert_eq!(result.total_references, 0);
		assert_eq!(result.page_faults, 0);
		assert_eq!(result.hit_ratio, 0.0);
		assert_eq!(result.fault_ratio, 0.0);
		assert!(result.page_sequence.is_empty());
	}

	#[test]
	fn rejects_zero_frames() {
		assert!(simulate(Algorithm::Fifo, &REFERENCE, 0).is_err());
	}
}
