use std::{io::Read, ptr};

use segfit::{Sbrk, global};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap` or
/// `gdb` between steps.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_program_break(
  label: &str,
) {
  println!(
    "[{}] PID = {}, program break (sbrk(0)) = {:?}",
    label,
    std::process::id(),
    Sbrk::program_break(),
  );
}

fn print_alloc(
  size: usize,
  address: *mut u8,
) {
  println!(
    "Allocated {} bytes, address = {:?}, program break = {:?}",
    size,
    address,
    Sbrk::program_break()
  );
}

fn print_stats(
  label: &str,
) {
  println!("[{}] {}", label, global::stats());
}

fn main() {
  unsafe {
    print_program_break("start");
    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 1) Two allocations on an empty heap: both grow the program break.
    // --------------------------------------------------------------------
    let first = global::allocate(100);
    println!("\n[1] Allocate 100 bytes");
    print_alloc(100, first);

    let second = global::allocate(50);
    println!("[1] Allocate 50 bytes");
    print_alloc(50, second);
    print_stats("1");

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 2) Free the first block and ask for less: the block is reused and the
    //    break does not move. The remainder is too small to split off.
    // --------------------------------------------------------------------
    global::free(first);
    print_stats("2 after free");

    let reused = global::allocate(40);
    println!("\n[2] Allocate 40 bytes");
    print_alloc(40, reused);
    println!(
      "[2] reused == first? {}",
      if reused == first {
        "Yes, the freed block was reused"
      } else {
        "No, the heap grew"
      }
    );

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 3) A large block freed and partly reused is split in two.
    // --------------------------------------------------------------------
    let large = global::allocate(8 * 1024);
    let guard = global::allocate(16);
    global::free(large);

    let part = global::allocate(1024);
    println!("\n[3] Allocate 1 KiB out of a freed 8 KiB block");
    print_alloc(1024, part);
    print_stats("3");

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 4) Resize keeps the data, growing in place when the next block is
    //    free.
    // --------------------------------------------------------------------
    ptr::write_bytes(part, 0xAB, 1024);
    let grown = global::resize(part, 4096);
    println!("\n[4] Resize 1 KiB -> 4 KiB, same address? {}", grown == part);
    println!("[4] first byte after resize = 0x{:X}", grown.read());
    print_stats("4");

    block_until_enter_pressed();

    // --------------------------------------------------------------------
    // 5) Free everything; neighbouring free blocks merge.
    // --------------------------------------------------------------------
    global::free(grown);
    global::free(guard);
    global::free(reused);
    global::free(second);
    print_stats("5");
    print_program_break("end");

    println!("\n[6] End of example. Process will exit and the OS will reclaim all memory.");
  }
}
