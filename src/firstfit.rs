//! C4: the first-fit engine.
//!
//! Blocks are packed end-to-end in a doubly-linked, address-ordered list.
//! Allocation scans from the head for the first free block that fits,
//! splitting it if there's room to spare; freeing marks a block free and
//! eagerly fuses it with free neighbours.

use std::{cmp, mem, ptr};

use crate::filter::SizeFilter;
use crate::heap;
use crate::stats::{self, BlockSnapshot};

/// Header embedded directly in the heap ahead of every block's payload.
#[repr(C)]
struct Block {
  size: usize,
  next: *mut Block,
  prev: *mut Block,
  is_free: bool,
  payload_ptr: *mut u8,
}

fn header_size() -> usize {
  mem::size_of::<Block>()
}

pub struct Engine {
  head: *mut Block,
  tail: *mut Block,
  filter: SizeFilter,
}

impl Engine {
  pub fn new() -> Self {
    Self { head: ptr::null_mut(), tail: ptr::null_mut(), filter: SizeFilter::new() }
  }

  pub fn set_min(&mut self, x: i64) -> i64 {
    self.filter.set_min(x)
  }

  pub fn set_max(&mut self, x: i64) -> i64 {
    self.filter.set_max(x)
  }

  pub fn allocate(&mut self, size: usize, fill: u8) -> *mut u8 {
    if size == 0 || !self.filter.accepts(size) {
      return ptr::null_mut();
    }

    let block = match self.find_fit(size) {
      Some(b) => {
        unsafe {
          if (*b).size > size {
            self.split(b, size);
          }
        }
        b
      }
      None => match self.extend(self.tail, size) {
        Some(b) => b,
        None => return ptr::null_mut(),
      },
    };

    unsafe {
      (*block).is_free = false;
      ptr::write_bytes((*block).payload_ptr, fill, size);
      (*block).payload_ptr
    }
  }

  pub fn reallocate(&mut self, ptr: *mut u8, size: usize, fill: u8) -> *mut u8 {
    if size == 0 {
      self.deallocate(ptr);
      return std::ptr::null_mut();
    }
    if ptr.is_null() {
      return self.allocate(size, fill);
    }

    let b = self.find_block(ptr);
    if b.is_null() || unsafe { (*b).is_free } {
      return std::ptr::null_mut();
    }

    unsafe {
      if (*b).size == size {
        return ptr;
      }
      if (*b).size > size && self.filter.meets_min(size) {
        self.split(b, size);
        return ptr;
      }
    }

    let new_ptr = self.allocate(size, fill);
    if new_ptr.is_null() {
      return std::ptr::null_mut();
    }

    unsafe {
      let copy_len = cmp::min(size, (*b).size);
      ptr::copy_nonoverlapping(ptr, new_ptr, copy_len);
      (*b).is_free = true;
      self.fusion(b);
    }
    new_ptr
  }

  pub fn deallocate(&mut self, ptr: *mut u8) {
    if ptr.is_null() {
      return;
    }
    let b = self.find_block(ptr);
    if b.is_null() {
      return;
    }
    unsafe {
      (*b).is_free = true;
      self.fusion(b);
    }
  }

  pub fn show_stats(&self) {
    stats::show(&self.snapshot_blocks(), heap::current_break() as usize);
  }

  fn snapshot_blocks(&self) -> Vec<BlockSnapshot> {
    let mut out = Vec::new();
    let mut cur = self.head;
    unsafe {
      while !cur.is_null() {
        let start = cur as usize;
        let end = (*cur).payload_ptr as usize + (*cur).size;
        out.push(BlockSnapshot { start, end, size: (*cur).size, is_free: (*cur).is_free });
        cur = (*cur).next;
      }
    }
    out
  }

  fn find_fit(&self, size: usize) -> Option<*mut Block> {
    let mut cur = self.head;
    unsafe {
      while !cur.is_null() {
        if (*cur).is_free && (*cur).size >= size {
          return Some(cur);
        }
        cur = (*cur).next;
      }
    }
    None
  }

  fn find_block(&self, ptr: *mut u8) -> *mut Block {
    let mut cur = self.head;
    unsafe {
      while !cur.is_null() {
        if (*cur).payload_ptr == ptr {
          return cur;
        }
        cur = (*cur).next;
      }
    }
    ptr::null_mut()
  }

  /// Shrinks `b` to `s` bytes, handling the surplus per spec.md's four
  /// split cases (tail-slide-next, tail-shrink-to-os, carve-new-block,
  /// or leave-as-internal-fragmentation).
  fn split(&mut self, b: *mut Block, s: usize) {
    unsafe {
      if (*b).size <= s {
        return;
      }
      let end_of_b = (*b).payload_ptr.add(s);
      let next = (*b).next;

      if !next.is_null() && (*next).is_free {
        let moved = slide_free_block_back(next, end_of_b);
        (*b).next = moved;
        if next == self.tail {
          self.tail = moved;
        }
        (*b).size = s;
      } else if next.is_null() {
        heap::set_break(end_of_b);
        (*b).size = s;
      } else if (*b).size - s >= header_size() {
        let new_block = end_of_b as *mut Block;
        (*new_block).size = (*b).size - s - header_size();
        (*new_block).is_free = true;
        (*new_block).payload_ptr = end_of_b.add(header_size());
        (*new_block).prev = b;
        (*new_block).next = next;
        (*next).prev = new_block;
        (*b).next = new_block;
        (*b).size = s;
      }
      // else: gap too small to host a header; left as internal fragmentation.
    }
  }

  fn fuse(&mut self, prior: *mut Block, late: *mut Block) {
    unsafe {
      (*prior).next = (*late).next;
      if !(*late).next.is_null() {
        (*(*late).next).prev = prior;
      } else {
        self.tail = prior;
      }
      (*prior).size += (*late).size + header_size();
    }
  }

  fn fusion(&mut self, b: *mut Block) -> *mut Block {
    unsafe {
      if !(*b).is_free {
        return b;
      }
      let mut b = b;
      if !(*b).prev.is_null() && (*(*b).prev).is_free {
        let prev = (*b).prev;
        self.fuse(prev, b);
        b = prev;
      }
      if !(*b).next.is_null() && (*(*b).next).is_free {
        self.fuse(b, (*b).next);
      }
      if (*b).next.is_null() {
        self.tail = b;
      }
      b
    }
  }

  /// Extends the heap to provide a block of `s` payload bytes, growing
  /// the existing free tail in place when possible.
  fn extend(&mut self, last: *mut Block, s: usize) -> Option<*mut Block> {
    unsafe {
      if !last.is_null() && (*last).is_free {
        let grow_by = s - (*last).size;
        heap::grow(grow_by)?;
        (*last).size = s;
        return Some(last);
      }

      let addr = heap::grow(header_size() + s)?;
      let header = addr as *mut Block;
      (*header).payload_ptr = addr.add(header_size());
      (*header).is_free = true;
      (*header).next = ptr::null_mut();
      (*header).prev = last;
      (*header).size = s;

      if last.is_null() {
        self.head = header;
      } else {
        (*last).next = header;
      }
      self.tail = header;
      Some(header)
    }
  }
}

/// Slides `next`'s header backward to `new_start`, absorbing the reclaimed
/// gap into its size. Used by [`Engine::split`]'s case where the block
/// immediately following the split already has free space to donate.
unsafe fn slide_free_block_back(next: *mut Block, new_start: *mut u8) -> *mut Block {
  unsafe {
    let old_start = next as *mut u8;
    let diff = old_start as usize - new_start as usize;
    ptr::copy(old_start, new_start, header_size());

    let moved = new_start as *mut Block;
    (*moved).size += diff;
    (*moved).payload_ptr = new_start.add(header_size());
    if !(*moved).next.is_null() {
      (*(*moved).next).prev = moved;
    }
    moved
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn allocate_returns_writable_memory() {
    let mut e = Engine::new();
    let p = e.allocate(5, 0) as *mut u32;
    assert!(!p.is_null());
    unsafe {
      p.write(0xdead_beef);
      assert_eq!(p.read(), 0xdead_beef);
    }
  }

  #[test]
  fn zero_size_request_returns_null() {
    let mut e = Engine::new();
    assert!(e.allocate(0, 0).is_null());
  }

  #[test]
  fn fill_byte_is_written_across_the_payload() {
    let mut e = Engine::new();
    let p = e.allocate(16, 0xAB);
    unsafe {
      for i in 0..16 {
        assert_eq!(*p.add(i), 0xAB);
      }
    }
  }

  #[test]
  fn free_then_allocate_reuses_the_same_address() {
    let mut e = Engine::new();
    let a = e.allocate(10, 0);
    e.deallocate(a);
    let b = e.allocate(10, 0);
    assert_eq!(a, b);
  }

  #[test]
  fn split_at_tail_places_second_allocation_header_size_above_first() {
    let mut e = Engine::new();
    let a = e.allocate(100, 0);
    e.deallocate(a);
    let b = e.allocate(5, 0);
    let c = e.allocate(5, 0);
    assert_eq!(a, b);
    assert_eq!(c as usize, b as usize + 5 + header_size());
  }

  #[test]
  fn coalesce_fusion_reunites_two_freed_neighbours() {
    let mut e = Engine::new();
    let a = e.allocate(5, 0);
    let b = e.allocate(5, 0);
    e.deallocate(a);
    e.deallocate(b);
    let c = e.allocate(20, 0);
    assert_eq!(c, a);
  }

  #[test]
  fn realloc_null_behaves_like_allocate() {
    let mut e = Engine::new();
    let p = e.reallocate(ptr::null_mut(), 10, 7);
    assert!(!p.is_null());
    unsafe {
      assert_eq!(*p, 7);
    }
  }

  #[test]
  fn realloc_zero_behaves_like_free() {
    let mut e = Engine::new();
    let a = e.allocate(5, 0);
    let r = e.reallocate(a, 0, 0);
    assert!(r.is_null());
    let b = e.allocate(5, 0);
    assert_eq!(a, b);
  }

  #[test]
  fn realloc_same_size_returns_same_pointer() {
    let mut e = Engine::new();
    let a = e.allocate(10, 0);
    let r = e.reallocate(a, 10, 0);
    assert_eq!(a, r);
  }

  #[test]
  fn realloc_invalid_pointer_returns_null() {
    let mut e = Engine::new();
    let bogus = 0x1usize as *mut u8;
    assert!(e.reallocate(bogus, 5, 0).is_null());
  }

  #[test]
  fn realloc_grows_by_copying_into_a_fresh_block() {
    let mut e = Engine::new();
    let a = e.allocate(4, 0) as *mut u8;
    unsafe {
      ptr::write_bytes(a, 0x42, 4);
    }
    let b = e.reallocate(a, 64, 0);
    assert!(!b.is_null());
    unsafe {
      for i in 0..4 {
        assert_eq!(*b.add(i), 0x42);
      }
    }
  }

  #[test]
  fn filter_rejects_out_of_range_sizes() {
    let mut e = Engine::new();
    e.set_min(10);
    e.set_max(15);
    assert!(e.allocate(5, 0).is_null());
    assert!(e.allocate(20, 0).is_null());

    e.set_min(4);
    e.set_max(21);
    assert!(!e.allocate(5, 0).is_null());
    assert!(!e.allocate(20, 0).is_null());
  }

  #[test]
  fn deallocate_null_is_a_noop() {
    let mut e = Engine::new();
    e.deallocate(ptr::null_mut());
  }

  #[test]
  fn deallocate_unknown_pointer_is_a_silent_noop() {
    let mut e = Engine::new();
    let bogus = 0x1usize as *mut u8;
    e.deallocate(bogus);
  }
}
