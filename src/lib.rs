//! # segfit - A Segregated-Fit Heap Allocator
//!
//! This crate provides a general-purpose heap that replaces the classic
//! allocation primitives (allocate, zero-allocate, free, resize) for a single
//! execution context. Memory is obtained from the operating system with
//! `sbrk` and is never given back; freed blocks are reused instead.
//!
//! ## Overview
//!
//! Every block carries a header with two independent sets of links:
//!
//! ```text
//!   Block Layout:
//!   ┌──────────────────────────────┬──────────────────────────────┐
//!   │         Block Header         │          Payload             │
//!   │  ┌────────────────────────┐  │                              │
//!   │  │ size: N                │  │  ┌────────────────────────┐  │
//!   │  │ is_free                │  │  │                        │  │
//!   │  │ addr:  prev / next     │  │  │    N bytes usable      │  │
//!   │  │ free:  prev / next     │  │  │                        │  │
//!   │  └────────────────────────┘  │  └────────────────────────┘  │
//!   │   HEADER_SIZE (48 on x86_64) │                              │
//!   └──────────────────────────────┴──────────────────────────────┘
//!                                  ▲
//!                                  └── Pointer returned to user
//! ```
//!
//! The `addr` links chain every block in ascending address order, which is
//! how physical neighbours are found for merging. The `free` links chain free
//! blocks inside one size-class bucket of the free index:
//!
//! ```text
//!   Address list:   [A used] ⇄ [B free] ⇄ [C used] ⇄ [D free] ⇄ [E used]
//!
//!   Free index:     bucket 0 (0..1000):     B
//!                   bucket 3 (3000..4000):  D
//!                   bucket 127 (126000..):  -
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   segfit
//!   ├── align         - Word rounding (align!)
//!   ├── block         - Block header and fixed-offset conversions
//!   ├── address_list  - Address-ordered list of all blocks
//!   ├── free_index    - Size-class buckets of free blocks
//!   ├── extender      - Heap growth: Sbrk, FixedRegion
//!   ├── config        - Limits and split threshold
//!   ├── error         - AllocError
//!   ├── heap          - Heap facade: allocate, free, resize
//!   ├── stats         - Read-only statistics
//!   └── global        - Process-wide heap behind a lock
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use segfit::{FixedRegion, Heap};
//!
//! let mut heap = Heap::new(FixedRegion::with_capacity(64 * 1024).unwrap());
//!
//! let ptr = heap.allocate(100).unwrap();
//! unsafe {
//!     ptr.as_ptr().write_bytes(0x2A, 100);
//!     heap.free(ptr.as_ptr());
//! }
//!
//! // Freed blocks are reused before the heap grows.
//! assert_eq!(ptr, heap.allocate(100).unwrap());
//! ```
//!
//! ## How It Works
//!
//! ```text
//!   allocate(n):   free index fit? ── yes ──► unindex, split surplus, return
//!                        │
//!                        no
//!                        ▼
//!                  extend heap by n + header ──► append as address tail
//!
//!   free(p):       mark free ──► merge free neighbours ──► index once
//!
//!   resize(p, n):  fits already? ──► split surplus, keep p
//!                  free successor big enough? ──► absorb it, keep p
//!                  otherwise allocate, copy, free p
//! ```
//!
//! A split only happens when the surplus holds a header plus
//! [`MIN_SPLIT_PAYLOAD`] bytes, so tiny fragments are never created.
//!
//! ## Limitations
//!
//! - **Single lock**: the [`global`] heap serializes every call
//! - **No shrinking**: the program break only moves up
//! - **Header alignment only**: payloads are aligned like the header
//! - **Bounded requests**: anything above [`MAX_SIZE`] is refused
//! - **Unix-only**: `Sbrk` needs `libc`
//!
//! ## Safety
//!
//! Freeing or resizing takes raw pointers that must have come from the same
//! heap, so those operations are `unsafe`.

pub mod align;
mod address_list;
mod block;
pub mod config;
mod error;
mod extender;
mod free_index;
pub mod global;
mod heap;
mod stats;

pub use block::{HEADER_ALIGN, HEADER_SIZE};
pub use config::{HeapConfig, MAX_SIZE, MIN_SPLIT_PAYLOAD};
pub use error::AllocError;
pub use extender::{FixedRegion, HeapExtender, Sbrk};
pub use global::Locked;
pub use heap::Heap;
pub use stats::HeapStats;
