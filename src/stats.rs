//! C7: the stats walker.
//!
//! Both engines hand their block list to this module as a flat snapshot
//! rather than exposing their raw pointers, so the printing logic (and
//! its tests) stay engine-agnostic. Purely observational: nothing here
//! ever mutates a block.

/// One block's externally-visible shape, independent of which engine it
/// came from.
#[derive(Debug, Clone, Copy)]
pub struct BlockSnapshot {
  pub start: usize,
  pub end: usize,
  pub size: usize,
  pub is_free: bool,
}

/// Prints two passes over `blocks` (allocated, then free) as
/// `start..end  size` rows, followed by a summary line with totals and
/// the gap between the current heap break and the accounted-for bytes.
pub fn show(blocks: &[BlockSnapshot], heap_break: usize) {
  println!("allocated blocks:");
  let mut allocated_total = 0usize;
  for b in blocks.iter().filter(|b| !b.is_free) {
    println!("  {:#x}..{:#x}  {} bytes", b.start, b.end, b.size);
    allocated_total += b.size;
  }

  println!("free blocks:");
  let mut free_total = 0usize;
  for b in blocks.iter().filter(|b| b.is_free) {
    println!("  {:#x}..{:#x}  {} bytes", b.start, b.end, b.size);
    free_total += b.size;
  }

  let accounted = allocated_total + free_total;
  let overhead = heap_break.saturating_sub(blocks.first().map_or(heap_break, |b| b.start));
  println!(
    "total: {} allocated, {} free, {} bytes overhead (headers + padding)",
    allocated_total,
    free_total,
    overhead.saturating_sub(accounted)
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn show_does_not_panic_on_an_empty_list() {
    show(&[], 0);
  }

  #[test]
  fn show_does_not_panic_on_a_mixed_list() {
    let blocks = vec![
      BlockSnapshot { start: 0x1000, end: 0x1010, size: 16, is_free: false },
      BlockSnapshot { start: 0x1010, end: 0x1040, size: 48, is_free: true },
    ];
    show(&blocks, 0x1040);
  }
}
