//! # dualloc - A Dual-Strategy Memory Allocator Library
//!
//! This crate provides a user-space heap manager that services `malloc`/
//! `realloc`/`free`-shaped requests by extending the process data segment
//! with `sbrk`, the same `libc` primitive this crate's bump-allocator
//! ancestor used. Unlike a bump allocator, freed memory is actually
//! reclaimed: a caller picks one of two block-management strategies and
//! the façade dispatches every request to whichever one was picked.
//!
//! ## Overview
//!
//! ```text
//!   Two strategies, one façade:
//!
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                     select_strategy("buddy")                     │
//!   │                              │                                   │
//!   │                              ▼                                   │
//!   │   ┌───────────────────┐          ┌────────────────────┐          │
//!   │   │   first-fit (C4)   │          │     buddy (C5)      │          │
//!   │   │  address-ordered   │          │  power-of-two       │          │
//!   │   │  free list, split  │          │  splitting/merging  │          │
//!   │   │  + eager fusion    │          │  via sibling depth  │          │
//!   │   └───────────────────┘          └────────────────────┘          │
//!   │              both grow the heap with sbrk(2)                     │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   dualloc
//!   ├── error     - SelectError, StrategyId
//!   ├── heap      - sbrk/brk wrapper, the only module that touches libc
//!   ├── pow2      - power-of-two rounding for the buddy engine
//!   ├── filter    - the [min, max] size-range gate shared by both engines
//!   ├── firstfit  - the first-fit engine
//!   ├── buddy     - the buddy engine
//!   ├── stats     - engine-agnostic block-list printing
//!   └── strategy  - the façade that owns exactly one committed engine
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dualloc::{select_strategy, allocate, reallocate, deallocate};
//!
//! fn main() {
//!     select_strategy("firstfit").unwrap();
//!
//!     let p = allocate(64, 0);
//!     let p = reallocate(p, 128, 0);
//!     deallocate(p);
//! }
//! ```
//!
//! ## Limitations
//!
//! - **Not shared across threads**: the free functions below are backed
//!   by thread-local state, so each thread that calls them gets its own
//!   independent heap and strategy choice rather than contending over one.
//! - **Unix-only**: requires `libc` and `sbrk`/`brk` (POSIX systems).
//! - **No alignment guarantees beyond the header's own layout.**

pub mod buddy;
pub mod error;
pub mod filter;
pub mod firstfit;
pub mod heap;
pub mod pow2;
pub mod stats;
pub mod strategy;

use std::cell::RefCell;

pub use error::{SelectError, StrategyId};
pub use strategy::Facade;

thread_local! {
  static FACADE: RefCell<Facade> = RefCell::new(Facade::new());
}

/// Commits this thread's façade to `"firstfit"` or `"buddy"`
/// (case-insensitive). Must happen before any other call if the caller
/// wants a say in which engine runs; otherwise the first `allocate`/
/// `reallocate`/`deallocate`/`set_min`/`set_max`/`show_stats` call commits
/// to first-fit implicitly and this call then fails.
pub fn select_strategy(name: &str) -> Result<StrategyId, SelectError> {
  FACADE.with(|f| f.borrow_mut().select(name))
}

/// Requests `size` bytes from the active strategy, filling them with
/// `fill`. Returns null on failure (size rejected by the filter, or the
/// heap could not be grown).
pub fn allocate(size: usize, fill: u8) -> *mut u8 {
  FACADE.with(|f| f.borrow_mut().allocate(size, fill))
}

/// Resizes a block previously returned by [`allocate`] or [`reallocate`].
/// `ptr == null` behaves like `allocate`; `size == 0` behaves like
/// [`deallocate`] and returns null.
pub fn reallocate(ptr: *mut u8, size: usize, fill: u8) -> *mut u8 {
  FACADE.with(|f| f.borrow_mut().reallocate(ptr, size, fill))
}

/// Releases a block back to the active strategy. Null and unrecognized
/// pointers are silently ignored.
pub fn deallocate(ptr: *mut u8) {
  FACADE.with(|f| f.borrow_mut().deallocate(ptr));
}

/// Sets the lower bound of the accepted allocation size range. Returns
/// the limit actually in effect afterward.
pub fn set_min(value: i64) -> i64 {
  FACADE.with(|f| f.borrow_mut().set_min(value))
}

/// Sets the upper bound of the accepted allocation size range (`-1`
/// disables it). Returns the limit actually in effect afterward.
pub fn set_max(value: i64) -> i64 {
  FACADE.with(|f| f.borrow_mut().set_max(value))
}

/// Prints the active strategy's block list and a summary to stdout.
pub fn show_stats() {
  FACADE.with(|f| f.borrow_mut().show_stats());
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn facade_functions_round_trip_an_allocation() {
    let p = allocate(32, 0x11);
    assert!(!p.is_null());
    unsafe {
      assert_eq!(*p, 0x11);
    }
    deallocate(p);
  }
}
