use std::io::Read;

use dualloc::{allocate, deallocate, reallocate, select_strategy, set_max, set_min, show_stats};
use libc::sbrk;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break using `sbrk(0)`.
/// The program break is the upper boundary of the heap managed via brk/sbrk.
fn print_program_break(label: &str) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    unsafe { sbrk(0) },
  );
}

fn main() {
  let strategy = std::env::args().nth(1).unwrap_or_else(|| "firstfit".to_string());
  select_strategy(&strategy).expect("usage: cli [firstfit|buddy]");
  println!("using strategy: {strategy}");

  print_program_break("start");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate 4 bytes and write a value into it.
  // --------------------------------------------------------------------
  let first = allocate(4, 0);
  println!("\n[1] Allocate 4 bytes -> {:?}", first);
  unsafe {
    (first as *mut u32).write(0xDEADBEEF);
    println!("[1] Value written = 0x{:X}", (first as *mut u32).read());
  }
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate 12 bytes and fill it with a byte pattern.
  // --------------------------------------------------------------------
  let second = allocate(12, 0xAB);
  println!("\n[2] Allocate 12 bytes -> {:?}", second);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Grow the first block in place via reallocate.
  // --------------------------------------------------------------------
  let grown = reallocate(first, 64, 0);
  println!("\n[3] Reallocate first block 4 -> 64 bytes, now at {:?}", grown);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Deallocate the second block, then allocate something small to
  //    see whether it gets reused.
  // --------------------------------------------------------------------
  deallocate(second);
  println!("\n[4] Deallocated second block at {:?}", second);
  let third = allocate(2, 0);
  println!(
    "[4] third == second? {}",
    if third == second { "yes, reused the freed block" } else { "no, allocated elsewhere" }
  );
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Apply a size filter and watch out-of-range requests get rejected.
  // --------------------------------------------------------------------
  set_min(8);
  set_max(256);
  println!("\n[5] Filter set to [8, 256]");
  println!("[5] allocate(4, 0)   -> {:?} (expect null)", allocate(4, 0));
  println!("[5] allocate(100, 0) -> {:?}", allocate(100, 0));
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 6) Grow the heap with a large allocation and show the final layout.
  // --------------------------------------------------------------------
  print_program_break("before large alloc");
  let big = allocate(64 * 1024, 0);
  println!("\n[6] Allocate 64 KiB -> {:?}", big);
  print_program_break("after large alloc");
  block_until_enter_pressed();

  println!("\n[7] Final block layout:");
  show_stats();
}
