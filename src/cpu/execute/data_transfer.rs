//! Data transfer instruction handlers (MOV, XCHG, etc.)

use crate::cpu::Cpu;
use crate::cpu::decode::DecodedInstruction;
use crate::memory::MemoryBus;

/// MOV r/m, r - Move register to register/memory
/// Handles both byte (0x88) and word (0x89) variants
///
/// The destination (r/m) is in the dst operand, source (r) is in the src operand
pub fn mov_rm_r(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let src_value = cpu.read_operand(mem, &instr.src);
    cpu.write_operand(mem, &instr.dst, src_value);
}

/// MOV r, r/m - Move register/memory to register
/// Handles both byte (0x8A) and word (0x8B) variants
///
/// The destination (r) is in the dst operand, source (r/m) is in the src operand
pub fn mov_r_rm(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let src_value = cpu.read_operand(mem, &instr.src);
    cpu.write_operand(mem, &instr.dst, src_value);
}

/// MOV r, imm - Move immediate to register
/// Handles both byte (0xB0-0xB7) and word (0xB8-0xBF) variants
///
/// The register is encoded in the low 3 bits of the opcode
/// The immediate value is in the src operand
pub fn mov_r_imm(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let imm_value = cpu.read_operand(mem, &instr.src);
    cpu.write_operand(mem, &instr.dst, imm_value);
}

/// MOV r/m, imm - Move immediate to register/memory
/// Handles both byte (0xC6) and word (0xC7) variants
///
/// The destination (r/m) is in the dst operand, immediate is in the src operand
pub fn mov_rm_imm(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let imm_value = cpu.read_operand(mem, &instr.src);
    cpu.write_operand(mem, &instr.dst, imm_value);
}

/// XCHG r/m, r - Exchange register with register/memory
/// Handles both byte (0x86) and word (0x87) variants
///
/// Swaps the values of the two operands
pub fn xchg_rm_r(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let dst_value = cpu.read_operand(mem, &instr.dst);
    let src_value = cpu.read_operand(mem, &instr.src);
    cpu.write_operand(mem, &instr.dst, src_value);
    cpu.write_operand(mem, &instr.src, dst_value);
}

/// XCHG AX, r16 - Exchange AX with a 16-bit register
/// Handles opcodes 0x91-0x97 (0x90 is NOP)
///
/// The register is encoded in the low 3 bits of the opcode
pub fn xchg_ax_r16(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let ax_value = cpu.read_reg16(0); // AX
    let r_value = cpu.read_operand(mem, &instr.dst);
    cpu.write_reg16(0, r_value);
    cpu.write_operand(mem, &instr.dst, ax_value);
}

/// LEA r16, m - Load Effective Address
/// Opcode: 0x8D
///
/// Calculates the effective address of the memory operand and loads it into
/// the destination register. Unlike MOV, this does NOT access memory - it just
/// calculates the offset portion of the address.
///
/// This instruction is commonly used for pointer arithmetic and address calculations.
/// No flags are affected.
pub fn lea(cpu: &mut Cpu, _mem: &mut MemoryBus, instr: &DecodedInstruction) {
    use crate::cpu::decode::OperandType;

    // LEA requires a memory operand as source
    // We need to calculate the effective address (offset) without accessing memory
    match instr.src.op_type {
        OperandType::Mem8 | OperandType::Mem16 => {
            // Direct addressing is flagged with the 0xFF sentinel in the low
            // byte of value; the address itself lives in disp.
            let base_index = (instr.src.value & 0xFF) as u8;
            let ea = if base_index == 0xFF {
                instr.src.disp as u16
            } else {
                let (_seg_idx, ea) = cpu.calculate_ea_from_operand(&instr.src, base_index);
                ea
            };

            // Store the effective address (offset) in the destination register
            cpu.write_operand(_mem, &instr.dst, ea);
        }
        OperandType::Direct => {
            // Direct addressing: just use the offset directly
            cpu.write_operand(_mem, &instr.dst, instr.src.value);
        }
        _ => {
            // LEA with register operand is invalid (though some assemblers allow it)
            panic!("LEA requires a memory operand");
        }
    }
}

/// MOV r/m16, Sreg - Move segment register to register/memory
/// Opcode: 0x8C
pub fn mov_rm_sreg(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let value = cpu.read_operand(mem, &instr.src);
    cpu.write_operand(mem, &instr.dst, value);
}

/// MOV Sreg, r/m16 - Move register/memory to segment register
/// Opcode: 0x8E
///
/// Loading SS delays interrupt recognition for one more instruction so a
/// SS:SP pair can be reloaded together without an interrupt splitting them.
pub fn mov_sreg_rm(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let value = cpu.read_operand(mem, &instr.src);
    let is_ss = instr.dst.value == 2;
    cpu.write_operand(mem, &instr.dst, value);
    if is_ss {
        cpu.set_interrupt_delay();
    }
}

/// MOV AL, moffs8 - Move byte at a direct address into AL
/// Opcode: 0xA0
pub fn mov_al_moffs(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let segment = moffs_segment(cpu, instr);
    let value = cpu.read_mem8(mem, segment, instr.src.value);
    cpu.write_reg8(0, value);
}

/// MOV AX, moffs16 - Move word at a direct address into AX
/// Opcode: 0xA1
pub fn mov_ax_moffs(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let segment = moffs_segment(cpu, instr);
    let value = cpu.read_mem16(mem, segment, instr.src.value);
    cpu.write_reg16(0, value);
}

/// MOV moffs8, AL - Move AL to a direct address
/// Opcode: 0xA2
pub fn mov_moffs_al(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let segment = moffs_segment(cpu, instr);
    let al = cpu.read_reg8(0);
    cpu.write_mem8(mem, segment, instr.dst.value, al);
}

/// MOV moffs16, AX - Move AX to a direct address
/// Opcode: 0xA3
pub fn mov_moffs_ax(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    let segment = moffs_segment(cpu, instr);
    let ax = cpu.read_reg16(0);
    cpu.write_mem16(mem, segment, instr.dst.value, ax);
}

#[inline]
fn moffs_segment(cpu: &mut Cpu, instr: &DecodedInstruction) -> u16 {
    let operand = if instr.has_src() { &instr.src } else { &instr.dst };
    if operand.segment != 0xFF {
        cpu.read_seg(operand.segment)
    } else {
        cpu.read_seg(3) // DS default
    }
}

/// LDS r16, m16:16 - Load DS:r16 from a far pointer in memory
/// Opcode: 0xC5
pub fn lds(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    load_far_pointer(cpu, mem, instr, 3);
}

/// LES r16, m16:16 - Load ES:r16 from a far pointer in memory
/// Opcode: 0xC4
pub fn les(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction) {
    load_far_pointer(cpu, mem, instr, 0);
}

fn load_far_pointer(cpu: &mut Cpu, mem: &mut MemoryBus, instr: &DecodedInstruction, seg: u8) {
    use crate::cpu::decode::OperandType;

    let base_index = (instr.src.value & 0xFF) as u8;
    let (seg_idx, ea) = if base_index == 0xFF {
        (3u8, instr.src.disp as u16)
    } else {
        cpu.calculate_ea_from_operand(&instr.src, base_index)
    };
    let segment = if instr.src.segment != 0xFF {
        cpu.read_seg(instr.src.segment)
    } else {
        cpu.read_seg(seg_idx)
    };

    let offset = cpu.read_mem16(mem, segment, ea);
    let far_seg = cpu.read_mem16(mem, segment, ea.wrapping_add(2));

    debug_assert!(matches!(
        instr.src.op_type,
        OperandType::Mem8 | OperandType::Mem16
    ));

    cpu.write_operand(mem, &instr.dst, offset);
    cpu.write_seg(seg, far_seg);
}

/// CBW - Convert byte to word (sign-extend AL into AX)
/// Opcode: 0x98
pub fn cbw(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    let al = cpu.read_reg8(0) as i8;
    cpu.write_reg16(0, al as i16 as u16);
}

/// CWD - Convert word to doubleword (sign-extend AX into DX:AX)
/// Opcode: 0x99
pub fn cwd(cpu: &mut Cpu, _mem: &mut MemoryBus, _instr: &DecodedInstruction) {
    let ax = cpu.read_reg16(0) as i16;
    cpu.write_reg16(2, if ax < 0 { 0xFFFF } else { 0 });
}
