// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generation-dependent encoding rules.
//!
//! Everything that varies with [`GfxLevel`] or with the hardware format class
//! is concentrated here so the validators stay declarative: sub-dword access
//! legality, partial-write widths, literal placement and the scalar operand
//! budget of vector ALU encodings.

use crate::ir::{GfxLevel, InstrExtra, Instruction, Program};
use crate::opcode::{Format, Opcode};

/// Whether the generation supports the SDWA encoding at all.
#[must_use]
pub fn sdwa_supported(gfx_level: GfxLevel) -> bool {
    (GfxLevel::Gfx8..=GfxLevel::Gfx10_3).contains(&gfx_level)
}

/// Whether a VOP3-encoded instruction may carry a literal constant.
#[must_use]
pub fn vop3_literal_supported(gfx_level: GfxLevel) -> bool {
    gfx_level >= GfxLevel::Gfx10
}

/// How many scalar values a vector ALU instruction may read through the
/// constant bus.
#[must_use]
pub fn const_bus_limit(gfx_level: GfxLevel, instr: &Instruction) -> usize {
    if instr.opcode == Opcode::VLshlrevB64 {
        // 64-bit shifts only bring one scalar path along.
        return 1;
    }
    if gfx_level >= GfxLevel::Gfx10 { 2 } else { 1 }
}

/// Bitmask of operand slots that accept a scalar register, per encoding.
/// Bit i set means operand i may be an SGPR.
#[must_use]
pub fn valu_scalar_mask(gfx_level: GfxLevel, instr: &Instruction) -> u32 {
    match instr.format {
        Format::Vop3 => 0x7,
        _ if instr.is_sdwa() => {
            if gfx_level >= GfxLevel::Gfx9 {
                0x7
            } else {
                0x4
            }
        }
        _ => 0x5,
    }
}

fn is_d16_load_hi(op: Opcode) -> bool {
    matches!(op, Opcode::BufferLoadShortD16Hi | Opcode::DsReadU16D16Hi)
}

fn is_d16_load(op: Opcode) -> bool {
    matches!(op, Opcode::BufferLoadShortD16) || is_d16_load_hi(op)
}

/// Whether an operand placed at a non-zero byte offset (or narrower than a
/// dword) is legal in slot `index` of `instr`.
#[must_use]
pub fn subdword_operand_ok(gfx_level: GfxLevel, instr: &Instruction, index: usize) -> bool {
    let op = &instr.operands[index];
    let byte = op.phys_reg().map_or(0, |r| r.byte());
    if byte == 0 && !instr.is_sdwa() {
        return true;
    }
    match instr.opcode {
        Opcode::PAsUniform => byte == 0,
        Opcode::VCvtF32Ubyte1 => byte <= 1,
        Opcode::DsWriteB16D16Hi => index != 1 || byte == 2,
        _ if instr.format == Format::Pseudo && gfx_level >= GfxLevel::Gfx8 => true,
        _ if instr.is_sdwa() => match instr.extra {
            InstrExtra::Sdwa { sel, .. } => {
                let sel = sel[index.min(1)];
                sel.size != 0
                    && byte % sel.size == 0
                    && byte + sel.offset + sel.size <= 4
            }
            _ => false,
        },
        _ => byte == 0,
    }
}

/// Whether a definition narrower than a dword, or at a non-zero byte offset,
/// is legal as the first definition of `instr`.
#[must_use]
pub fn subdword_definition_ok(gfx_level: GfxLevel, instr: &Instruction) -> bool {
    let byte = instr.definitions[0].phys_reg().map_or(0, |r| r.byte());
    match instr.opcode {
        _ if instr.format == Format::Pseudo && gfx_level >= GfxLevel::Gfx8 => true,
        _ if instr.is_sdwa() => match instr.extra {
            InstrExtra::Sdwa { dst_sel, .. } => {
                dst_sel.size != 0
                    && byte % dst_sel.size == 0
                    && byte + dst_sel.offset + dst_sel.size <= 4
            }
            _ => false,
        },
        op if is_d16_load_hi(op) => byte == 2,
        _ => byte == 0,
    }
}

/// Whether this format may hold a sub-dword definition wider than a dword.
/// Such definitions only appear on copy-like pseudos and on vector memory
/// loads that write partial registers.
#[must_use]
pub fn can_write_oversized_subdword(format: Format) -> bool {
    matches!(
        format,
        Format::Pseudo
            | Format::PseudoBranch
            | Format::PseudoReduction
            | Format::Mubuf
            | Format::Mimg
            | Format::Flat
            | Format::Global
    )
}

/// How many bytes definition `index` of `instr` actually writes.
///
/// This can exceed the definition size: hardware writes whole dwords unless
/// the encoding preserves the untouched bytes, and the allocation validator
/// uses the written extent to detect clobbers of neighbouring values.
#[must_use]
pub fn bytes_written(program: &Program, instr: &Instruction, index: usize) -> u32 {
    let def = &instr.definitions[index];
    if instr.format == Format::Pseudo {
        return if program.gfx_level >= GfxLevel::Gfx8 {
            def.bytes()
        } else {
            def.size() * 4
        };
    }
    if instr.is_valu() {
        if let InstrExtra::Sdwa { dst_sel, .. } = instr.extra {
            return dst_sel.size;
        }
        if instr.opcode == Opcode::VAddF16 {
            return 2;
        }
        return def.size() * 4;
    }
    if let InstrExtra::Mimg { d16: true } = instr.extra {
        return def.bytes();
    }
    if is_d16_load(instr.opcode) {
        return 2;
    }
    def.size() * 4
}

/// Whether hardware preserves the other bytes of the dword around a partial
/// write of `bytes_written` bytes at `byte` for this instruction.
#[must_use]
pub fn partial_write_preserves(
    gfx_level: GfxLevel,
    instr: &Instruction,
    byte: u32,
    written: u32,
) -> bool {
    if instr.format == Format::Pseudo {
        return true;
    }
    if instr.is_sdwa() && gfx_level >= GfxLevel::Gfx9 {
        return true;
    }
    if is_d16_load(instr.opcode) || matches!(instr.extra, InstrExtra::Mimg { d16: true }) {
        // D16 accesses only touch their own half of the dword.
        return written == 2 && byte % 2 == 0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Definition, Operand, SubdwordSel};
    use crate::reg::{PhysReg, RegClass};
    use alloc::vec;

    #[test]
    fn sdwa_generation_window() {
        assert!(!sdwa_supported(GfxLevel::Gfx11));
        assert!(sdwa_supported(GfxLevel::Gfx8));
        assert!(sdwa_supported(GfxLevel::Gfx10_3));
    }

    #[test]
    fn const_bus_widens_on_gfx10() {
        let instr = Instruction::new(
            Opcode::VAddF32,
            vec![Operand::constant(4, 1), Operand::constant(4, 2)],
            vec![],
        );
        assert_eq!(const_bus_limit(GfxLevel::Gfx9, &instr), 1);
        assert_eq!(const_bus_limit(GfxLevel::Gfx10, &instr), 2);
    }

    #[test]
    fn sdwa_selects_gate_operand_bytes() {
        let t = crate::ir::Temp::new(1, RegClass::V2B);
        let instr = Instruction::new(
            Opcode::VAddF16,
            vec![
                Operand::temp(t).fixed(PhysReg::vgpr(0).advance(2)),
                Operand::temp(t).fixed(PhysReg::vgpr(1)),
            ],
            vec![Definition::new(t)],
        )
        .with_extra(InstrExtra::Sdwa {
            dst_sel: SubdwordSel::new(2, 0),
            sel: [SubdwordSel::new(2, 0), SubdwordSel::new(2, 0)],
        });
        assert!(subdword_operand_ok(GfxLevel::Gfx9, &instr, 0));
        assert!(subdword_operand_ok(GfxLevel::Gfx9, &instr, 1));
    }

    #[test]
    fn zero_width_sdwa_select_is_rejected() {
        let t = crate::ir::Temp::new(1, RegClass::V2B);
        let instr = Instruction::new(
            Opcode::VAddF16,
            vec![
                Operand::temp(t).fixed(PhysReg::vgpr(0).advance(2)),
                Operand::temp(t).fixed(PhysReg::vgpr(1)),
            ],
            vec![Definition::new(t)],
        )
        .with_extra(InstrExtra::Sdwa {
            dst_sel: SubdwordSel::new(0, 0),
            sel: [SubdwordSel::new(0, 0), SubdwordSel::new(0, 0)],
        });
        assert!(!subdword_operand_ok(GfxLevel::Gfx9, &instr, 0));
        assert!(!subdword_definition_ok(GfxLevel::Gfx9, &instr));
    }

    #[test]
    fn d16_hi_loads_write_the_high_half() {
        let t = crate::ir::Temp::new(1, RegClass::V2B);
        let instr = Instruction::new(
            Opcode::DsReadU16D16Hi,
            vec![],
            vec![Definition::new(t).fixed(PhysReg::vgpr(0).advance(2))],
        );
        assert!(subdword_definition_ok(GfxLevel::Gfx9, &instr));
        assert!(partial_write_preserves(GfxLevel::Gfx9, &instr, 2, 2));
    }
}
