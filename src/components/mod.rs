//! IBM PC peripheral components
//!
//! These model the fixed-function chips around the 8088: the interrupt
//! controller, timer, DMA controller, floppy controller/drive, keyboard
//! buffer, PPI, and the MDA text-mode adapter. The CPU core only ever
//! touches them through [`crate::io::IoDevice`] and the [`crate::components::pic::Pic`]
//! handle exposed by [`crate::memory::MemoryBus`].

pub mod dma;
pub mod fdc;
pub mod floppy;
pub mod keyboard;
pub mod mda;
pub mod pic;
pub mod pit;
pub mod ppi;
