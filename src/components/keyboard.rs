//! IBM PC Keyboard - Simple scancode buffer
//!
//! The Keyboard is a simple data structure that buffers scancodes from the GUI.
//! It does not implement IoDevice - all I/O is handled by the PPI.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// IBM PC Keyboard
///
/// Simple scancode buffer that receives input from the GUI.
/// The PPI pulls scancodes from this buffer during its tick().
pub struct Keyboard {
    /// Shared queue of keyboard scancodes from GUI
    scancode_queue: Arc<RwLock<VecDeque<u8>>>,
}

impl Keyboard {
    /// Create a new keyboard with the given scancode queue
    ///
    /// # Arguments
    /// * `scancode_queue` - Shared queue for receiving scancodes from GUI
    pub fn new(scancode_queue: Arc<RwLock<VecDeque<u8>>>) -> Self {
        Self { scancode_queue }
    }

    /// Pop the next scancode from the queue
    ///
    /// Returns the next available scancode, or None if queue is empty.
    pub fn pop_scancode(&mut self) -> Option<u8> {
        self.scancode_queue.write().ok()?.pop_front()
    }

    /// Check if there are scancodes available
    pub fn has_scancode(&self) -> bool {
        self.scancode_queue
            .read()
            .map(|q| !q.is_empty())
            .unwrap_or(false)
    }

    /// Reset the keyboard
    ///
    /// Clears the queue and pushes the 0xAA self-test success code.
    /// Called by PPI when keyboard reset sequence completes.
    pub fn reset(&mut self) {
        if let Ok(mut queue) = self.scancode_queue.write() {
            queue.clear();
            queue.push_back(0xAA); // Self-test passed
        }
    }

    /// Get the keyboard scancode queue for GUI integration
    pub fn scancode_queue(&self) -> Arc<RwLock<VecDeque<u8>>> {
        self.scancode_queue.clone()
    }
}
