// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Textual rendering of instructions for diagnostics.

use alloc::string::String;
use core::fmt::{self, Write};

use crate::ir::{Definition, Instruction, Operand};

fn write_operand(out: &mut impl Write, op: &Operand) -> fmt::Result {
    if let Some(temp) = op.as_temp() {
        write!(out, "%{}:{}", temp.id(), temp.reg_class())?;
        if let Some(reg) = op.phys_reg() {
            write!(out, "({reg})")?;
        }
        if op.is_late_kill() {
            out.write_str("(late kill)")?;
        } else if op.is_kill() {
            out.write_str("(kill)")?;
        }
    } else if op.is_undefined() {
        match op.reg_class() {
            Some(rc) => write!(out, "undef:{rc}")?,
            None => out.write_str("undef")?,
        }
    } else if op.is_literal() {
        write!(out, "0x{:x}(lit)", op.constant_value())?;
    } else {
        write!(out, "0x{:x}", op.constant_value())?;
    }
    Ok(())
}

fn write_definition(out: &mut impl Write, def: &Definition) -> fmt::Result {
    write!(out, "%{}:{}", def.temp_id(), def.reg_class())?;
    if let Some(reg) = def.phys_reg() {
        write!(out, "({reg})")?;
    }
    Ok(())
}

/// Renders one instruction the way findings quote it, e.g.
/// `%5:v1(v3) = v_add_f32 %2:v1(v0)(kill), %3:v1(v1)`.
#[must_use]
pub fn instr_to_string(instr: &Instruction) -> String {
    let mut out = String::new();
    for (i, def) in instr.definitions.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write_definition(&mut out, def);
    }
    if !instr.definitions.is_empty() {
        out.push_str(" = ");
    }
    out.push_str(instr.opcode.name());
    for (i, op) in instr.operands.iter().enumerate() {
        out.push_str(if i == 0 { " " } else { ", " });
        let _ = write_operand(&mut out, op);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Temp;
    use crate::opcode::Opcode;
    use crate::reg::{PhysReg, RegClass};
    use alloc::vec;

    #[test]
    fn renders_defs_operands_and_flags() {
        let a = Temp::new(2, RegClass::V1);
        let d = Temp::new(5, RegClass::V1);
        let instr = Instruction::new(
            Opcode::VAddF32,
            vec![
                Operand::temp(a).fixed(PhysReg::vgpr(0)).kill(),
                Operand::constant(4, 42),
            ],
            vec![Definition::new(d).fixed(PhysReg::vgpr(3))],
        );
        assert_eq!(
            instr_to_string(&instr),
            "%5:v1(v3) = v_add_f32 %2:v1(v0)(kill), 0x2a"
        );
    }

    #[test]
    fn renders_bare_and_undef_forms() {
        let instr = Instruction::new(Opcode::SEndpgm, vec![], vec![]);
        assert_eq!(instr_to_string(&instr), "s_endpgm");

        let instr = Instruction::new(
            Opcode::PCreateVector,
            vec![Operand::undef(RegClass::V1)],
            vec![Definition::new(Temp::new(1, RegClass::V1))],
        );
        assert_eq!(instr_to_string(&instr), "%1:v1 = p_create_vector undef:v1");
    }
}
