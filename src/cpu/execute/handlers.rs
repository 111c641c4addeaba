//! Basic instruction handlers and handler utilities

use crate::cpu::error::CpuError;
use crate::cpu::snapshot::StateSnapshot;
use crate::cpu::Cpu;
use crate::cpu::decode::DecodedInstruction;
use crate::memory::MemoryBus;

/// Handler for invalid/unimplemented opcodes
///
/// This handler is called when an unknown or unimplemented opcode is
/// encountered (including 80186+-only encodings this core doesn't define).
/// Rather than unwinding the host process, it records a `CpuError` on the
/// CPU and halts it; the embedding harness inspects this via
/// `Cpu::take_pending_error` and decides whether to terminate or recover.
pub fn invalid_opcode(cpu: &mut Cpu, _mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let cs = cpu.read_seg(1);
    let ip = cpu.ip.wrapping_sub(1); // IP was already advanced past the opcode byte
    let snapshot = StateSnapshot::capture(cpu);
    cpu.raise_error(CpuError::InvalidOpcode {
        opcode: instr.opcode,
        cs,
        ip,
        snapshot,
    });
}

/// Handler for NOP (0x90) - No operation
///
/// Does nothing. The NOP instruction takes 3 cycles on the 8088.
pub fn nop(_cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    // Do nothing
}

/// Handler for HLT (0xF4) - Halt
///
/// Stops instruction execution until an interrupt (NMI or unmasked IRQ)
/// arrives. `Cpu::step` keeps polling `check_interrupts` while halted.
pub fn hlt(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    cpu.halted = true;
}

/// Handler for ESC (0xD8-0xDF) - Escape to coprocessor
///
/// No 8087 is emulated; the ModR/M byte (and any memory operand it
/// addresses) is decoded and otherwise ignored.
pub fn esc(_cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    // Do nothing
}

/// Handler for WAIT (0x9B)
///
/// Suspends the CPU until the 8087's TEST line goes low. No coprocessor is
/// emulated, so this is a no-op here too.
pub fn wait(_cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    // Do nothing
}

/// Handler for XLAT (0xD7) - Table look-up translation
///
/// AL = \[DS:BX + AL\], honoring a segment override prefix.
pub fn xlat(cpu: &mut Cpu, mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    let segment = cpu
        .segment_override
        .map(|s| cpu.read_seg(s))
        .unwrap_or_else(|| cpu.read_seg(3));
    let bx = cpu.read_reg16(3);
    let al = cpu.read_reg8(0);
    let offset = bx.wrapping_add(al as u16);
    let value = cpu.read_mem8(mem, segment, offset);
    cpu.write_reg8(0, value);
}
