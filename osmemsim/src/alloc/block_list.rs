//! Free-block list
//!
//! An index-addressed ordered sequence of blocks covering the whole of
//! memory, rather than a pointer-linked list, so splits and merges stay
//! simple.

/// Placement algorithm for variable-sized allocations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitAlgorithm {
	FirstFit,
	BestFit,
	WorstFit,
}

impl FitAlgorithm {
	/// All algorithms, in candidate priority order
	pub const ALL: [Self; 3] = [Self::FirstFit, Self::BestFit, Self::WorstFit];
}

/// Block state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
	Free,
	Allocated,
}

/// A block of memory, `[start, end)`
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct MemoryBlock {
	pub start: u64,
	pub end:   u64,
	pub state: BlockState,
	pub owner: Option<String>,
}

impl MemoryBlock {
	/// Returns this block's size
	pub fn size(&self) -> u64 {
		self.end - self.start
	}
}

/// Ordered block list over `[0, memory_size)`.
///
/// Invariant: blocks are sorted by start, non-overlapping, and cover
/// all of memory with no gaps. Holds after every allocation and release.
#[derive(Clone, Debug)]
pub struct BlockList {
	memory_size: u64,
	blocks:      Vec<MemoryBlock>,
}

impl BlockList {
	/// Creates a block list with all of memory free
	pub fn new(memory_size: u64) -> Self {
		Self {
			memory_size,
			blocks: vec![MemoryBlock {
				start: 0,
				end:   memory_size,
				state: BlockState::Free,
				owner: None,
			}],
		}
	}

	/// Selects a free block able to hold `size` bytes, per `algorithm`.
	///
	/// Ties are broken by earliest start. Returns `None` when no free
	/// block qualifies.
	pub fn select_free(&self, size: u64, algorithm: FitAlgorithm) -> Option<usize> {
		let mut candidates = self
			.blocks
			.iter()
			.enumerate()
			.filter(|(_, block)| block.state == BlockState::Free && block.size() >= size);

		match algorithm {
			FitAlgorithm::FirstFit => candidates.next().map(|(idx, _)| idx),
			FitAlgorithm::BestFit => {
				let mut best: Option<(usize, u64)> = None;
				for (idx, block) in candidates {
					let leftover = block.size() - size;
					if best.map_or(true, |(_, best_leftover)| leftover < best_leftover) {
						best = Some((idx, leftover));
					}
				}
				best.map(|(idx, _)| idx)
			},
			FitAlgorithm::WorstFit => {
				let mut worst: Option<(usize, u64)> = None;
				for (idx, block) in candidates {
					let leftover = block.size() - size;
					if worst.map_or(true, |(_, worst_leftover)| leftover > worst_leftover) {
						worst = Some((idx, leftover));
					}
				}
				worst.map(|(idx, _)| idx)
			},
		}
	}

	/// Allocates `size` bytes at the start of the free block `block_idx` to `owner`.
	///
	/// Splits off the residual free block, if any (a zero-sized residual
	/// is dropped). Returns the allocated range.
	///
	/// # Panics
	/// Panics if `block_idx` isn't a free block of at least `size` bytes.
	pub fn allocate(&mut self, block_idx: usize, size: u64, owner: &str) -> (u64, u64) {
		let block = &self.blocks[block_idx];
		assert!(block.state == BlockState::Free && block.size() >= size, "Invalid block");

		let start = block.start;
		let end = start + size;
		let residual = block.size() - size;

		self.blocks[block_idx] = MemoryBlock {
			start,
			end,
			state: BlockState::Allocated,
			owner: Some(owner.to_owned()),
		};
		if residual > 0 {
			self.blocks.insert(block_idx + 1, MemoryBlock {
				start: end,
				end:   end + residual,
				state: BlockState::Free,
				owner: None,
			});
		}

		debug_assert!(self.covers_memory());
		(start, end)
	}

	/// Releases all blocks owned by `owner`, merging adjacent free blocks.
	///
	/// Returns the number of bytes released.
	pub fn release(&mut self, owner: &str) -> u64 {
		let mut released = 0;
		for block in &mut self.blocks {
			if block.owner.as_deref() == Some(owner) {
				released += block.size();
				block.state = BlockState::Free;
				block.owner = None;
			}
		}

		// Merge runs of adjacent free blocks
		let mut merged = Vec::with_capacity(self.blocks.len());
		for block in self.blocks.drain(..) {
			match merged.last_mut() {
				Some(last @ MemoryBlock { state: BlockState::Free, .. }) if block.state == BlockState::Free => {
					last.end = block.end;
				},
				_ => merged.push(block),
			}
		}
		self.blocks = merged;

		debug_assert!(self.covers_memory());
		released
	}

	/// Returns the sum of all free-block sizes
	pub fn free_bytes(&self) -> u64 {
		self.blocks
			.iter()
			.filter(|block| block.state == BlockState::Free)
			.map(MemoryBlock::size)
			.sum()
	}

	/// Returns all blocks, in ascending-start order
	pub fn blocks(&self) -> &[MemoryBlock] {
		&self.blocks
	}

	/// Consumes the list, returning all blocks
	pub fn into_blocks(self) -> Vec<MemoryBlock> {
		self.blocks
	}

	/// Returns whether the blocks exactly partition `[0, memory_size)`
	pub fn covers_memory(&self) -> bool {
		let mut expected_start = 0;
		for block in &self.blocks {
			if block.start != expected_start || block.end < block.start {
				return false;
			}
			expected_start = block.end;
		}
		expected_start == self.memory_size
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Builds a list with two free holes: `[0, 100)` of 100 bytes and
	/// `[400, 700)` of 300 bytes
	fn two_holes() -> BlockList {
		let mut list = BlockList::new(1000);
		list.allocate(0, 100, "a");
		list.allocate(1, 300, "b");
		list.allocate(2, 300, "c");
		list.allocate(3, 300, "d");
		list.release("a");
		list.release("c");
		assert!(list.covers_memory());
		list
	}

	#[test]
	fn first_fit_picks_earliest() {
		let list = two_holes();
		let idx = list.select_free(50, FitAlgorithm::FirstFit).expect("Fits both holes");
		assert_eq!(list.blocks()[idx].start, 0);
	}

	#[test]
	fn best_fit_picks_tightest() {
		let list = two_holes();
		let idx = list.select_free(50, FitAlgorithm::BestFit).expect("Fits both holes");
		assert_eq!(list.blocks()[idx].start, 0);
	}

	#[test]
	fn worst_fit_picks_largest() {
		let list = two_holes();
		let idx = list.select_free(50, FitAlgorithm::WorstFit).expect("Fits both holes");
		assert_eq!(list.blocks()[idx].start, 400);
	}

	#[test]
	fn no_fit_when_holes_too_small() {
		let list = two_holes();
		// 400 bytes free in total, but no single hole holds 350
		assert_eq!(list.free_bytes(), 400);
		assert_eq!(list.select_free(350, FitAlgorithm::FirstFit), None);
	}

	#[test]
	fn exact_fit_drops_residual() {
		let mut list = BlockList::new(100);
		list.allocate(0, 100, "a");
		assert_eq!(list.blocks().len(), 1);
		assert_eq!(list.free_bytes(), 0);
		assert!(list.covers_memory());
	}

	#[test]
	fn release_merges_adjacent_free_blocks() {
		let mut list = BlockList::new(300);
		list.allocate(0, 100, "a");
		list.allocate(1, 100, "b");
		list.release("a");
		list.release("b");
		assert_eq!(list.blocks().len(), 1);
		assert_eq!(list.free_bytes(), 300);
	}
}
