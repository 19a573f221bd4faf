//! The heap source: a monotonic extender over the process data segment.
//!
//! Both engines grow their managed region by moving the program break with
//! `sbrk(2)`. This module is the only place that system call appears; the
//! engines never touch `libc` directly.

use libc::{c_void, intptr_t, sbrk};

/// Extends the data segment by `n` bytes and returns the address of the
/// first new byte, or `None` if the kernel refused (`sbrk` returns
/// `(void*)-1`, typically `RLIMIT_DATA` or genuine OOM).
pub fn grow(n: usize) -> Option<*mut u8> {
  let addr = unsafe { sbrk(n as intptr_t) };
  if addr == usize::MAX as *mut c_void {
    return None;
  }
  Some(addr as *mut u8)
}

/// Sets the program break to exactly `addr`, shrinking (or growing) the
/// data segment to end there. Used only by first-fit's tail-split case,
/// which returns surplus bytes to the operating system.
///
/// Returns `false` if the kernel refused the new break.
pub fn set_break(addr: *mut u8) -> bool {
  unsafe { libc::brk(addr as *mut c_void) == 0 }
}

/// The current program break, i.e. the address one past the end of the
/// heap this process currently owns.
pub fn current_break() -> *mut u8 {
  unsafe { sbrk(0) as *mut u8 }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn grow_advances_the_break_by_exactly_n() {
    let before = current_break();
    let addr = grow(256).expect("grow should succeed under normal limits");
    let after = current_break();

    assert_eq!(addr, before);
    assert_eq!(after as usize, before as usize + 256);
  }

  #[test]
  fn set_break_can_rewind_to_a_prior_break() {
    let before = current_break();
    grow(4096).expect("grow should succeed");
    assert!(set_break(before));
    assert_eq!(current_break(), before);
  }

  #[test]
  fn successive_grows_are_contiguous() {
    let a = grow(64).unwrap();
    let b = grow(128).unwrap();
    assert_eq!(b as usize, a as usize + 64);
  }

  #[test]
  fn current_break_does_not_mutate_state() {
    let a = current_break();
    let b = current_break();
    assert_eq!(a, b);
  }

  /// Pins RLIMIT_DATA just above the current break, the same knob
  /// `tests/MyAllocTest.cc` in the original source turns to exercise
  /// out-of-memory handling, then confirms `grow` reports failure instead
  /// of handing back a bogus address.
  #[test]
  fn grow_returns_none_once_rlimit_data_is_exhausted() {
    let mut limit = libc::rlimit { rlim_cur: 0, rlim_max: 0 };
    let got = unsafe { libc::getrlimit(libc::RLIMIT_DATA, &mut limit) };
    assert_eq!(got, 0, "getrlimit should succeed");
    let original = limit;

    let headroom: libc::rlim_t = 4096;
    let capped = libc::rlimit {
      rlim_cur: current_break() as libc::rlim_t + headroom,
      rlim_max: limit.rlim_max,
    };
    if unsafe { libc::setrlimit(libc::RLIMIT_DATA, &capped) } != 0 {
      // Some sandboxes forbid lowering RLIMIT_DATA at all; skip rather
      // than fail on environments that can't grant the precondition.
      return;
    }

    let result = grow(16 * 1024 * 1024);
    unsafe {
      libc::setrlimit(libc::RLIMIT_DATA, &original);
    }
    assert!(result.is_none());
  }
}
