//! Flag manipulation instruction handlers
//!
//! This module contains handlers for instructions that directly manipulate CPU flags:
//! - CLC/STC: Clear/Set Carry Flag
//! - CLI/STI: Clear/Set Interrupt Flag
//! - CLD/STD: Clear/Set Direction Flag

use crate::cpu::Cpu;
use crate::cpu::decode::DecodedInstruction;
use crate::memory::MemoryBus;

/// Handler for CLC (0xF8) - Clear Carry Flag
///
/// Clears the carry flag (CF) to 0.
/// Takes 2 cycles on the 8088.
#[inline(always)]
pub fn clc(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    cpu.set_flag(Cpu::CF, false);
}

/// Handler for STC (0xF9) - Set Carry Flag
///
/// Sets the carry flag (CF) to 1.
/// Takes 2 cycles on the 8088.
#[inline(always)]
pub fn stc(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    cpu.set_flag(Cpu::CF, true);
}

/// Handler for CLI (0xFA) - Clear Interrupt Flag
///
/// Clears the interrupt enable flag (IF) to 0.
/// When IF is cleared, maskable hardware interrupts are disabled.
/// Takes 2 cycles on the 8088.
#[inline(always)]
pub fn cli(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    cpu.set_flag(Cpu::IF, false);
}

/// Handler for STI (0xFB) - Set Interrupt Flag
///
/// Sets the interrupt enable flag (IF) to 1. Recognition is delayed by one
/// instruction, so STI;IRET and STI;HLT idioms retire the instruction right
/// after STI before any interrupt can be taken.
/// Takes 2 cycles on the 8088.
#[inline(always)]
pub fn sti(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    cpu.set_flag(Cpu::IF, true);
    cpu.set_interrupt_delay();
}

/// Handler for CLD (0xFC) - Clear Direction Flag
///
/// Clears the direction flag (DF) to 0.
/// When DF is 0, string operations increment SI/DI (forward direction).
/// Takes 2 cycles on the 8088.
#[inline(always)]
pub fn cld(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    cpu.set_flag(Cpu::DF, false);
}

/// Handler for STD (0xFD) - Set Direction Flag
///
/// Sets the direction flag (DF) to 1.
/// When DF is 1, string operations decrement SI/DI (backward direction).
/// Takes 2 cycles on the 8088.
#[inline(always)]
pub fn std(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    cpu.set_flag(Cpu::DF, true);
}

/// Handler for CMC (0xF5) - Complement Carry Flag
pub fn cmc(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    let cf = cpu.get_flag(Cpu::CF);
    cpu.set_flag(Cpu::CF, !cf);
}

/// Handler for LAHF (0x9F) - Load AH from Flags
///
/// AH = SF:ZF:0:AF:0:PF:1:CF (low byte of FLAGS)
pub fn lahf(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    let flags = cpu.get_flags();
    cpu.write_reg8(4, flags as u8); // AH
}

/// Handler for SAHF (0x9E) - Store AH into Flags
///
/// Loads SF:ZF:0:AF:0:PF:1:CF from AH; the upper byte of FLAGS is untouched.
pub fn sahf(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    let ah = cpu.read_reg8(4);
    let flags = cpu.get_flags();
    cpu.set_flags((flags & 0xFF00) | ah as u16);
}

/// Handler for PUSHF (0x9C) - Push Flags
pub fn pushf(cpu: &mut Cpu, mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    use super::stack::push_word;
    let flags = cpu.get_flags();
    push_word(cpu, mem, flags);
}

/// Handler for POPF (0x9D) - Pop Flags
///
/// Like IRET, an interrupt-enabling POPF delays recognition by one
/// instruction so the following instruction always retires first.
pub fn popf(cpu: &mut Cpu, mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    use super::stack::pop_word;
    let flags = pop_word(cpu, mem);
    cpu.set_flags(flags);
    cpu.set_interrupt_delay();
}
