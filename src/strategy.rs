//! C6: the strategy façade.
//!
//! A [`Facade`] starts uncommitted. The first explicit [`Facade::select`]
//! or the first dispatched allocation call commits it to an engine; every
//! later `select` call (explicit or implicit) is then an error. This
//! mirrors spec.md §9's "explicit engine handle" design note: rather than
//! two process-wide engine statics switched by a flag, the façade owns
//! exactly one of the two engine values, picked once.

use crate::error::{SelectError, StrategyId};
use crate::{buddy, firstfit};

enum Strategy {
  FirstFit(firstfit::Engine),
  Buddy(buddy::Engine),
}

pub struct Facade {
  strategy: Option<Strategy>,
}

impl Facade {
  pub fn new() -> Self {
    Self { strategy: None }
  }

  /// One-time, case-insensitive strategy selection. Fails with
  /// [`SelectError::AlreadySelected`] if a strategy is already committed
  /// (explicitly or by lazy default), or [`SelectError::InvalidName`] if
  /// `name` is neither `"firstfit"` nor `"buddy"`.
  pub fn select(&mut self, name: &str) -> Result<StrategyId, SelectError> {
    if self.strategy.is_some() {
      return Err(SelectError::AlreadySelected);
    }
    let id = match name.to_ascii_lowercase().as_str() {
      "firstfit" => StrategyId::FirstFit,
      "buddy" => StrategyId::Buddy,
      _ => return Err(SelectError::InvalidName),
    };
    self.commit(id);
    Ok(id)
  }

  pub fn allocate(&mut self, size: usize, fill: u8) -> *mut u8 {
    match self.engine() {
      Strategy::FirstFit(e) => e.allocate(size, fill),
      Strategy::Buddy(e) => e.allocate(size, fill),
    }
  }

  pub fn reallocate(&mut self, ptr: *mut u8, size: usize, fill: u8) -> *mut u8 {
    match self.engine() {
      Strategy::FirstFit(e) => e.reallocate(ptr, size, fill),
      Strategy::Buddy(e) => e.reallocate(ptr, size, fill),
    }
  }

  pub fn deallocate(&mut self, ptr: *mut u8) {
    match self.engine() {
      Strategy::FirstFit(e) => e.deallocate(ptr),
      Strategy::Buddy(e) => e.deallocate(ptr),
    }
  }

  pub fn set_min(&mut self, value: i64) -> i64 {
    match self.engine() {
      Strategy::FirstFit(e) => e.set_min(value),
      Strategy::Buddy(e) => e.set_min(value),
    }
  }

  pub fn set_max(&mut self, value: i64) -> i64 {
    match self.engine() {
      Strategy::FirstFit(e) => e.set_max(value),
      Strategy::Buddy(e) => e.set_max(value),
    }
  }

  pub fn show_stats(&mut self) {
    match self.engine() {
      Strategy::FirstFit(e) => e.show_stats(),
      Strategy::Buddy(e) => e.show_stats(),
    }
  }

  fn commit(&mut self, id: StrategyId) {
    self.strategy = Some(match id {
      StrategyId::FirstFit => Strategy::FirstFit(firstfit::Engine::new()),
      StrategyId::Buddy => Strategy::Buddy(buddy::Engine::new()),
    });
  }

  /// Returns the committed engine, lazily defaulting to first-fit (and
  /// locking further selection) if nothing was selected yet.
  fn engine(&mut self) -> &mut Strategy {
    if self.strategy.is_none() {
      self.commit(StrategyId::FirstFit);
    }
    self.strategy.as_mut().unwrap()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_name_is_invalid_argument() {
    let mut f = Facade::new();
    assert_eq!(f.select("quicksort"), Err(SelectError::InvalidName));
  }

  #[test]
  fn selecting_twice_is_rejected() {
    let mut f = Facade::new();
    assert_eq!(f.select("buddy"), Ok(StrategyId::Buddy));
    assert_eq!(f.select("firstfit"), Err(SelectError::AlreadySelected));
  }

  #[test]
  fn selection_is_case_insensitive() {
    let mut f = Facade::new();
    assert_eq!(f.select("BuDdY"), Ok(StrategyId::Buddy));
  }

  #[test]
  fn dispatch_before_select_locks_in_the_default() {
    let mut f = Facade::new();
    assert!(!f.allocate(8, 0).is_null());
    assert_eq!(f.select("buddy"), Err(SelectError::AlreadySelected));
  }

  #[test]
  fn selected_strategy_actually_services_allocations() {
    let mut f = Facade::new();
    f.select("buddy").unwrap();
    let p = f.allocate(5, 0);
    assert!(!p.is_null());
    f.deallocate(p);
  }
}
