//! The size-range filter (C3): rejects allocation requests outside a
//! configurable `[min, max]` window before either engine is consulted.
//!
//! Limits are kept as `i64` rather than `usize` so that `-1` can serve as
//! the "no upper bound" sentinel without ambiguity against a legitimately
//! huge unsigned request; every comparison here is therefore signed.

/// Distinguished `max_limit` value meaning "no upper bound".
pub const UNBOUNDED: i64 = -1;

#[derive(Debug, Clone, Copy)]
pub struct SizeFilter {
  min_limit: i64,
  max_limit: i64,
}

impl Default for SizeFilter {
  fn default() -> Self {
    Self { min_limit: 0, max_limit: UNBOUNDED }
  }
}

impl SizeFilter {
  pub fn new() -> Self {
    Self::default()
  }

  /// `min_limit = max(0, x)`, but only applied if it would still be `<=`
  /// the current `max_limit` (unbounded max always accepts). Returns the
  /// effective `min_limit` whether or not the call took effect.
  pub fn set_min(&mut self, x: i64) -> i64 {
    let candidate = x.max(0);
    if self.max_limit == UNBOUNDED || candidate <= self.max_limit {
      self.min_limit = candidate;
    }
    self.min_limit
  }

  /// `x == -1` disables the upper bound. Otherwise the new limit is only
  /// applied if `x > min_limit`, and is floored at 1 (per spec.md's
  /// REDESIGN: the source's `min(1, x)` is a transcription bug for
  /// `max(1, x)`). Returns the effective `max_limit`.
  pub fn set_max(&mut self, x: i64) -> i64 {
    if x == UNBOUNDED {
      self.max_limit = UNBOUNDED;
    } else if x > self.min_limit {
      self.max_limit = x.max(1);
    }
    self.max_limit
  }

  /// Whether `size` falls inside `[min_limit, max_limit]` (max unchecked
  /// when unbounded).
  pub fn accepts(&self, size: usize) -> bool {
    let size = size.min(i64::MAX as usize) as i64;
    if size < self.min_limit {
      return false;
    }
    self.max_limit == UNBOUNDED || size <= self.max_limit
  }

  /// Whether `size` alone clears `min_limit`, ignoring `max_limit`. Used
  /// by realloc's in-place-shrink case, which only cares about the floor.
  pub fn meets_min(&self, size: usize) -> bool {
    let size = size.min(i64::MAX as usize) as i64;
    size >= self.min_limit
  }
}
