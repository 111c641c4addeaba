//! Memory bus emulation
//!
//! The IBM PC memory layout, linear over the 8088's 20-bit address space:
//! - 0x00000-0x9FFFF: Conventional RAM (640KB)
//! - 0xA0000-0xEFFFF: Mapped region (video RAM, adapter ROM windows). Writes
//!   here mark a 256-byte page dirty so peripherals (e.g. the MDA) can avoid
//!   rescanning untouched video memory.
//! - 0xF0000-0xFFFFF: BIOS ROM. Writes are silently dropped.
//!
//! The bus also owns the decoded-instruction cache tier 2 uses to skip
//! re-decoding hot addresses, and keyed port dispatch for IN/OUT.

use crate::components::mda::Mda;
use crate::components::pic::Pic;
use crate::cpu::tier2::DecodeCache;
use crate::io::IoDevice;

/// Total addressable memory: 1 MiB, the 8088's full 20-bit address space.
pub const MEMORY_SIZE: usize = 0x100000;

/// Start of the mapped region (video memory, adapter ROM windows).
pub const MAPPED_START: u32 = 0xA0000;

/// Start of the BIOS ROM region. Writes at or above this address are dropped.
pub const ROM_START: u32 = 0xF0000;

/// Size in bytes of a single dirty-bitmap page.
const DIRTY_PAGE_SIZE: u32 = 256;

/// Number of dirty-bitmap pages covering the mapped region.
const DIRTY_PAGE_COUNT: usize = ((ROM_START - MAPPED_START) / DIRTY_PAGE_SIZE) as usize;

/// MDA video RAM window.
const MDA_VRAM_START: u32 = 0xB0000;
const MDA_VRAM_END: u32 = 0xB0FFF;

/// Longest possible 8086 instruction this decoder produces (opcode + ModR/M +
/// 16-bit displacement + 16-bit immediate). A write anywhere in the last
/// `MAX_INSTRUCTION_LEN - 1` bytes before the written address could be
/// touching an operand of an instruction cached at an earlier start address,
/// so self-modifying-code invalidation has to cover that whole window, not
/// just the byte actually written.
const MAX_INSTRUCTION_LEN: u32 = 6;

/// Memory bus for the IBM PC
pub struct MemoryBus {
    /// Linear 1 MiB address space.
    ram: Box<[u8; MEMORY_SIZE]>,

    /// Dirty flags for the mapped region, one bit per 256-byte page.
    dirty_pages: [bool; DIRTY_PAGE_COUNT],

    /// Decoded-instruction cache (tier 2), keyed by physical address.
    /// Only ever holds entries for writable RAM below `MAPPED_START` -
    /// the mapped and ROM regions are never cached since they can be
    /// reprogrammed by adapters outside the CPU's write-invalidation path.
    decode_cache: DecodeCache,

    /// Programmable Interrupt Controller
    pic: Pic,

    /// Monochrome Display Adapter
    mda: Mda,

    /// Registered I/O devices (PIT, PPI, DMA, FDC, ...)
    io_devices: Vec<Box<dyn IoDevice>>,
}

impl MemoryBus {
    /// Create a new memory bus with zeroed RAM
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; MEMORY_SIZE]),
            dirty_pages: [false; DIRTY_PAGE_COUNT],
            decode_cache: DecodeCache::new(),
            pic: Pic::new(0x08),
            mda: Mda::new(),
            io_devices: Vec::new(),
        }
    }

    /// Read a byte from memory
    #[inline(always)]
    pub fn read_u8(&self, addr: u32) -> u8 {
        let addr = addr & 0xFFFFF;
        if (MDA_VRAM_START..=MDA_VRAM_END).contains(&addr) {
            return self.mda.read_vram((addr - MDA_VRAM_START) as u16);
        }
        self.ram[addr as usize]
    }

    /// Write a byte to memory
    #[inline(always)]
    pub fn write_u8(&mut self, addr: u32, value: u8) {
        let addr = addr & 0xFFFFF;

        if addr >= ROM_START {
            // ROM is read-only; writes are silently dropped.
            return;
        }

        if (MDA_VRAM_START..=MDA_VRAM_END).contains(&addr) {
            self.mda.write_vram((addr - MDA_VRAM_START) as u16, value);
        }

        self.ram[addr as usize] = value;

        if addr >= MAPPED_START {
            self.mark_page_dirty(addr);
        } else {
            let window_start = addr.saturating_sub(MAX_INSTRUCTION_LEN - 1);
            self.decode_cache
                .invalidate_range(window_start, addr - window_start + 1);
        }
    }

    /// Read a word (little-endian) from memory
    #[inline(always)]
    pub fn read_u16(&self, addr: u32) -> u16 {
        let lo = self.read_u8(addr) as u16;
        let hi = self.read_u8(addr.wrapping_add(1)) as u16;
        lo | (hi << 8)
    }

    /// Write a word (little-endian) to memory
    ///
    /// Unaligned or page-crossing writes are split byte-by-byte, so a word
    /// straddling the ROM boundary drops only the half that lands in ROM.
    #[inline(always)]
    pub fn write_u16(&mut self, addr: u32, value: u16) {
        self.write_u8(addr, value as u8);
        self.write_u8(addr.wrapping_add(1), (value >> 8) as u8);
    }

    fn mark_page_dirty(&mut self, addr: u32) {
        let page = ((addr - MAPPED_START) / DIRTY_PAGE_SIZE) as usize;
        if page < self.dirty_pages.len() {
            self.dirty_pages[page] = true;
        }
    }

    /// Check and clear the dirty bit for the page containing `addr`.
    /// Used by peripherals (CGA/MDA) to know when to regenerate a region
    /// of the framebuffer without rescanning untouched video memory.
    pub fn take_dirty(&mut self, addr: u32) -> bool {
        if addr < MAPPED_START || addr >= ROM_START {
            return false;
        }
        let page = ((addr - MAPPED_START) / DIRTY_PAGE_SIZE) as usize;
        if page >= self.dirty_pages.len() {
            return false;
        }
        let was_dirty = self.dirty_pages[page];
        self.dirty_pages[page] = false;
        was_dirty
    }

    /// Load data into RAM at the given linear offset (e.g. a boot sector or
    /// test program image).
    pub fn load(&mut self, data: &[u8], offset: usize) {
        let end = (offset + data.len()).min(self.ram.len());
        self.ram[offset..end].copy_from_slice(&data[..end - offset]);
    }

    /// Load a BIOS image into the top of ROM, right-aligned to 0x100000 so a
    /// short image still lands at the reset vector.
    pub fn load_rom(&mut self, rom: &[u8]) {
        let len = rom.len().min(MEMORY_SIZE - ROM_START as usize);
        let start = MEMORY_SIZE - len;
        self.ram[start..].copy_from_slice(&rom[rom.len() - len..]);
    }

    /// Register an I/O peripheral to receive IN/OUT traffic for its port range.
    pub fn register_io_device(&mut self, device: Box<dyn IoDevice>) {
        self.io_devices.push(device);
    }

    /// Read a byte from an I/O port, dispatching to whichever registered
    /// device claims it. Unmapped ports read as 0xFF.
    pub fn io_read_u8(&mut self, port: u16) -> u8 {
        if Self::mda_port(port) {
            return self.mda.read_u8(port);
        }
        for device in self.io_devices.iter_mut() {
            if device.port_range().contains(&port) {
                return device.read_u8(port);
            }
        }
        0xFF
    }

    /// Write a byte to an I/O port, dispatching to whichever registered
    /// device claims it. Writes to unmapped ports are ignored.
    pub fn io_write_u8(&mut self, port: u16, value: u8) {
        if Self::mda_port(port) {
            self.mda.write_u8(port, value);
            return;
        }
        for device in self.io_devices.iter_mut() {
            if device.port_range().contains(&port) {
                device.write_u8(port, value);
                return;
            }
        }
    }

    /// Read a word from an I/O port (low byte then high byte).
    pub fn io_read_u16(&mut self, port: u16) -> u16 {
        let lo = self.io_read_u8(port) as u16;
        let hi = self.io_read_u8(port.wrapping_add(1)) as u16;
        lo | (hi << 8)
    }

    /// Write a word to an I/O port (low byte then high byte).
    pub fn io_write_u16(&mut self, port: u16, value: u16) {
        self.io_write_u8(port, value as u8);
        self.io_write_u8(port.wrapping_add(1), (value >> 8) as u8);
    }

    fn mda_port(port: u16) -> bool {
        matches!(port, 0x3B4 | 0x3B5 | 0x3B8 | 0x3BA)
    }

    /// Advance peripheral state by `cycles` CPU clocks, after an instruction
    /// has retired. Devices may raise IRQs through the PIC as a result.
    pub fn tick(&mut self, cycles: u16) {
        self.mda.tick(cycles);
        for device in self.io_devices.iter_mut() {
            device.tick(cycles, &mut self.pic);
        }
    }

    /// The Programmable Interrupt Controller.
    pub fn pic(&self) -> &Pic {
        &self.pic
    }

    /// Mutable access to the Programmable Interrupt Controller.
    pub fn pic_mut(&mut self) -> &mut Pic {
        &mut self.pic
    }

    /// The Monochrome Display Adapter.
    pub fn mda(&self) -> &Mda {
        &self.mda
    }

    /// Mutable access to the decoded-instruction cache (tier 2).
    pub fn decode_cache_mut(&mut self) -> &mut DecodeCache {
        &mut self.decode_cache
    }

    /// Read-only access to the decoded-instruction cache (tier 2).
    pub fn decode_cache(&self) -> &DecodeCache {
        &self.decode_cache
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}
