//! Intel 8255 Programmable Peripheral Interface (PPI) Emulation
//!
//! The 8255 PPI handles:
//! - Port 0x60 (Port A): DIP switches or keyboard scancode
//! - Port 0x61 (Port B): System control (speaker, keyboard clock, etc.)
//! - Port 0x62 (Port C): System status bits

use crate::components::keyboard::Keyboard;
use crate::components::pic::Pic;
use crate::io::IoDevice;
use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::{Arc, RwLock};

/// PPI I/O ports
const PPI_PORT_A: u16 = 0x60; // Data port (DIP switches or keyboard)
const PPI_PORT_B: u16 = 0x61; // System control port B
const PPI_PORT_C: u16 = 0x62; // System control port C

/// DIP switch configuration: 64K RAM, MDA display, no floppy, no 8087
/// Bits 7-6: Number of floppy drives (00 = 1)
/// Bits 5-4: Video mode (11 = MDA 80x25)
/// Bits 3-2: RAM size (11 = 64K)
/// Bit 1: 8087 installed (0 = no)
/// Bit 0: Floppy installed (1 = no)
const DIP_SWITCHES: u8 = 0b00111101; // 0x3D

/// Keyboard reset state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyboardResetState {
    /// Normal operation (bit 6 = 0, clock enabled)
    Idle,
    /// Reset in progress (bit 6 = 1, clock disabled)
    ResetAsserted,
}

/// Intel 8255 PPI for IBM PC
///
/// Handles keyboard data, DIP switches, and system control ports.
/// Owns the Keyboard scancode buffer internally.
pub struct Ppi {
    /// Keyboard scancode buffer (owned by PPI)
    keyboard: Keyboard,

    /// Latched scancode ready to be read from Port A
    latched_scancode: Option<u8>,

    /// Internal interrupt state (determines IRQ1 level)
    interrupt_pending: bool,

    /// Current value of Port B (system control)
    port_b_state: u8,

    /// DIP switch configuration
    dip_switches: u8,

    /// Keyboard reset state machine
    reset_state: KeyboardResetState,

    /// Flag indicating reset just completed and we need to trigger keyboard reset
    reset_pending: bool,
}

impl Ppi {
    /// Create a new PPI with default DIP switch configuration
    pub fn new(scancode_queue: Arc<RwLock<VecDeque<u8>>>) -> Self {
        Self {
            keyboard: Keyboard::new(scancode_queue),
            latched_scancode: None,
            interrupt_pending: false,
            port_b_state: 0x00,
            dip_switches: DIP_SWITCHES,
            reset_state: KeyboardResetState::Idle,
            reset_pending: false,
        }
    }

    /// Create a new PPI with custom DIP switch configuration
    pub fn with_dip_switches(scancode_queue: Arc<RwLock<VecDeque<u8>>>, dip_switches: u8) -> Self {
        Self {
            keyboard: Keyboard::new(scancode_queue),
            latched_scancode: None,
            interrupt_pending: false,
            port_b_state: 0x00,
            dip_switches,
            reset_state: KeyboardResetState::Idle,
            reset_pending: false,
        }
    }

    /// Get the keyboard scancode queue for GUI integration
    pub fn scancode_queue(&self) -> Arc<RwLock<VecDeque<u8>>> {
        self.keyboard.scancode_queue()
    }
}

impl IoDevice for Ppi {
    fn port_range(&self) -> RangeInclusive<u16> {
        PPI_PORT_A..=PPI_PORT_C
    }

    fn read_u8(&mut self, port: u16) -> u8 {
        match port {
            PPI_PORT_A => {
                // Bit 7 of Port B selects what Port A returns:
                // 1 = DIP switches, 0 = keyboard scancode
                if self.port_b_state & 0x80 != 0 {
                    // Return DIP switches
                    self.dip_switches
                } else {
                    // Return latched scancode (or DIP switches if none)
                    let data = self.latched_scancode.unwrap_or(self.dip_switches);

                    // Clear latched scancode after reading (in keyboard mode)
                    self.latched_scancode = None;

                    // Lower internal interrupt state
                    self.interrupt_pending = false;

                    data
                }
            }

            PPI_PORT_B => {
                // Read back Port B state
                // Real hardware has some read-only status bits here
                // For now just return 0x00 like the original implementation
                0x00
            }

            PPI_PORT_C => {
                // System Control Port C
                // Bit 7: Parity error (always 0 - no parity checking)
                // Bit 6: I/O channel check (always 0)
                // Bit 5: Timer 2 output state
                // Bit 4: RAM parity error (always 0)
                // Bits 3-0: Various system status
                0x00
            }

            _ => 0xFF,
        }
    }

    fn write_u8(&mut self, port: u16, value: u8) {
        match port {
            PPI_PORT_A => {
                // Port A is typically input-only on IBM PC
                // Writes are ignored
            }

            PPI_PORT_B => {
                // Detect keyboard reset via bit 6 transitions
                // Bit 6: 0 = keyboard clock enabled, 1 = keyboard clock disabled (reset)
                let old_bit6 = (self.port_b_state & 0x40) != 0;
                let new_bit6 = (value & 0x40) != 0;

                match (old_bit6, new_bit6) {
                    (false, true) => {
                        // Keyboard clock disabled (reset asserted)
                        self.reset_state = KeyboardResetState::ResetAsserted;
                        // Clear any latched scancode during reset
                        self.latched_scancode = None;
                        self.interrupt_pending = false;
                    }
                    (true, false) => {
                        // Keyboard clock re-enabled (reset released)
                        // Schedule keyboard reset for next tick
                        if self.reset_state == KeyboardResetState::ResetAsserted {
                            self.reset_pending = true;
                            self.reset_state = KeyboardResetState::Idle;
                        }
                    }
                    _ => {
                        // No transition on bit 6
                    }
                }

                self.port_b_state = value;
            }

            PPI_PORT_C => {
                // Port C writes are typically ignored on IBM PC
                let _ = value;
            }

            _ => {}
        }
    }

    fn tick(&mut self, _cycles: u16, pic: &mut Pic) {
        // Step 1: Set PIC IRQ1 to match internal interrupt state
        if self.interrupt_pending {
            pic.set_irq_level(1, true);
        } else {
            pic.set_irq_level(1, false);
        }

        // Step 2: Handle keyboard reset if pending
        if self.reset_pending {
            self.keyboard.reset();
            self.reset_pending = false;
        }

        // Step 3: If no latched scancode, check keyboard for buffered scancodes
        if self.latched_scancode.is_none() {
            if let Some(scancode) = self.keyboard.pop_scancode() {
                // Latch the new scancode
                self.latched_scancode = Some(scancode);

                // Raise internal interrupt state
                self.interrupt_pending = true;

                // Immediately raise IRQ1
                pic.set_irq_level(1, true);
            }
        }
    }
}
