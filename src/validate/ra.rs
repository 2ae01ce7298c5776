// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Register assignment validation.
//!
//! Two passes. The first walks every operand and definition once and checks
//! the assignment in isolation: present, in budget, consistent across all
//! sightings of the temporary, byte-legal for sub-dword classes, contiguous
//! where vector alignment is required and matching for tied slots. The
//! second replays each block against a byte-granular model of the register
//! file, seeded from the live-in set, and reports stale reads, overlapping
//! definitions and partial-write clobbers.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::analysis::liveness::compute_live;
use crate::diag::{DiagnosticSink, Finding, FindingKind};
use crate::ir::{EdgeKind, Instruction, Program};
use crate::isa::{
    bytes_written, can_write_oversized_subdword, partial_write_preserves,
    subdword_definition_ok, subdword_operand_ok,
};
use crate::opcode::Opcode;
use crate::print::instr_to_string;
use crate::reg::{PhysReg, RegBank, REG_FILE_BYTES};

/// Where in the program a temporary was sighted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Location {
    block: u32,
    instr: Option<usize>,
}

impl Location {
    fn describe(self) -> String {
        match self.instr {
            Some(i) => format!("BB{} instruction {}", self.block, i),
            None => format!("start of BB{}", self.block),
        }
    }
}

/// The register a temporary was assigned, with provenance for messages.
#[derive(Copy, Clone, Debug)]
struct Assignment {
    reg: PhysReg,
    firstloc: Location,
    valid: bool,
}

struct RaChecker<'a> {
    program: &'a Program,
    sink: &'a mut dyn DiagnosticSink,
    assignments: HashMap<u32, Assignment>,
    valid: bool,
}

impl RaChecker<'_> {
    fn err(&mut self, block: u32, instr: Option<&Instruction>, message: String) {
        self.valid = false;
        self.sink.report(Finding {
            kind: FindingKind::Allocation,
            block,
            message,
            instr: instr.map(instr_to_string),
        });
    }

    fn check_sighting(
        &mut self,
        temp: crate::ir::Temp,
        reg: PhysReg,
        loc: Location,
        instr: &Instruction,
    ) {
        let limits = &self.program.limits;
        let rc = temp.reg_class();
        let mut ok = true;

        match rc.bank() {
            RegBank::Vgpr | RegBank::LinearVgpr => {
                let lo = 256;
                let hi = 256 + limits.num_vgprs;
                if reg.reg() < lo || reg.reg() + rc.size() > hi {
                    self.err(
                        loc.block,
                        Some(instr),
                        format!("%{} assigned outside the vgpr file at {}", temp.id(), reg),
                    );
                    ok = false;
                }
            }
            RegBank::Sgpr => {
                let hi = reg.reg() + rc.size();
                let in_budget = hi <= limits.num_sgprs;
                // The fixed address registers (vcc, m0, exec, scc) live at
                // or above `sgpr_limit` and sit outside the budget.
                let carve_out = reg.reg() >= limits.sgpr_limit;
                let is_vcc = reg == crate::reg::VCC && rc.size() <= 2;
                if is_vcc && !self.program.needs_vcc {
                    self.err(
                        loc.block,
                        Some(instr),
                        format!("%{} assigned to vcc but the program does not reserve it", temp.id()),
                    );
                    ok = false;
                } else if !in_budget && !carve_out {
                    self.err(
                        loc.block,
                        Some(instr),
                        format!("%{} assigned outside the sgpr budget at {}", temp.id(), reg),
                    );
                    ok = false;
                }
                if reg.byte() != 0 {
                    self.err(
                        loc.block,
                        Some(instr),
                        format!("scalar %{} assigned at a byte offset", temp.id()),
                    );
                    ok = false;
                }
            }
        }

        if rc.is_subdword() && reg.byte() + rc.bytes() > 4
            && !can_write_oversized_subdword(instr.format)
        {
            self.err(
                loc.block,
                Some(instr),
                format!("sub-dword %{} crosses a dword boundary at {}", temp.id(), reg),
            );
            ok = false;
        }

        match self.assignments.get(&temp.id()).copied() {
            Some(prev) if prev.reg != reg => {
                self.err(
                    loc.block,
                    Some(instr),
                    format!(
                        "%{} assigned {} here but {} at {}",
                        temp.id(),
                        reg,
                        prev.reg,
                        prev.firstloc.describe()
                    ),
                );
            }
            Some(_) => {}
            None => {
                self.assignments.insert(
                    temp.id(),
                    Assignment {
                        reg,
                        firstloc: loc,
                        valid: ok,
                    },
                );
            }
        }
    }

    fn check_instruction(&mut self, block: u32, index: usize, instr: &Instruction) {
        let loc = Location {
            block,
            instr: Some(index),
        };

        for (i, op) in instr.operands.iter().enumerate() {
            let Some(temp) = op.as_temp() else { continue };
            let Some(reg) = op.phys_reg() else {
                self.err(
                    block,
                    Some(instr),
                    format!("operand %{} has no register assigned", temp.id()),
                );
                continue;
            };
            self.check_sighting(temp, reg, loc, instr);
            if (temp.reg_class().is_subdword() || reg.byte() != 0)
                && !subdword_operand_ok(self.program.gfx_level, instr, i)
            {
                self.err(
                    block,
                    Some(instr),
                    format!("sub-dword operand %{} illegal at {}", temp.id(), reg),
                );
            }
            if op.is_vector_aligned() {
                let next = instr.operands.get(i + 1);
                let contiguous = next
                    .and_then(|n| n.phys_reg())
                    .is_some_and(|n| reg.advance(op.bytes()) == n);
                if !contiguous {
                    self.err(
                        block,
                        Some(instr),
                        format!(
                            "vector-aligned operand %{} at {} is not contiguous with the next operand",
                            temp.id(),
                            reg
                        ),
                    );
                }
            }
        }

        for (i, def) in instr.definitions.iter().enumerate() {
            let temp = def.temp();
            let Some(reg) = def.phys_reg() else {
                self.err(
                    block,
                    Some(instr),
                    format!("definition %{} has no register assigned", temp.id()),
                );
                continue;
            };
            self.check_sighting(temp, reg, loc, instr);
            if i == 0
                && (temp.reg_class().is_subdword() || reg.byte() != 0)
                && !subdword_definition_ok(self.program.gfx_level, instr)
            {
                self.err(
                    block,
                    Some(instr),
                    format!("sub-dword definition %{} illegal at {}", temp.id(), reg),
                );
            }
            if let Some(&tied_op) = instr.opcode.info().tied.get(i) {
                let tied = instr.operands.get(tied_op as usize).and_then(|o| o.phys_reg());
                if tied != Some(reg) {
                    self.err(
                        block,
                        Some(instr),
                        format!(
                            "definition %{} must reuse the register of operand {}",
                            temp.id(),
                            tied_op
                        ),
                    );
                }
            }
        }
    }

    fn reg_of(&self, id: u32) -> Option<PhysReg> {
        self.assignments.get(&id).filter(|a| a.valid).map(|a| a.reg)
    }
}

fn fill(regs: &mut [u32; REG_FILE_BYTES], reg: PhysReg, bytes: u32, id: u32) {
    let lo = reg.reg_b() as usize;
    let hi = lo + bytes as usize;
    if hi <= REG_FILE_BYTES {
        for b in &mut regs[lo..hi] {
            *b = id;
        }
    }
}

fn clear(regs: &mut [u32; REG_FILE_BYTES], reg: PhysReg, bytes: u32) {
    fill(regs, reg, bytes, 0);
}

/// Sgpr operands that logical phis in `block`'s logical successors select
/// from `block`. They stay blocked until the logical end of the block.
fn phi_sgpr_ops(program: &Program, block: usize) -> Vec<u32> {
    let mut out = Vec::new();
    for &succ in program.blocks[block].succs(EdgeKind::Logical) {
        let sblock = &program.blocks[succ as usize];
        let Some(pos) = sblock
            .preds(EdgeKind::Logical)
            .iter()
            .position(|&p| p as usize == block)
        else {
            continue;
        };
        for instr in &sblock.instructions {
            if !instr.is_phi() {
                break;
            }
            if instr.opcode != Opcode::PPhi {
                continue;
            }
            if let Some(temp) = instr.operands.get(pos).and_then(|o| o.as_temp()) {
                if temp.reg_class().bank() == RegBank::Sgpr {
                    out.push(temp.id());
                }
            }
        }
    }
    out
}

/// Validates that physical register assignments respect value lifetimes.
#[must_use]
pub fn validate_ra(program: &Program, sink: &mut dyn DiagnosticSink) -> bool {
    let mut c = RaChecker {
        program,
        sink,
        assignments: HashMap::new(),
        valid: true,
    };

    for block in &program.blocks {
        for (i, instr) in block.instructions.iter().enumerate() {
            c.check_instruction(block.index, i, instr);
        }
    }

    let live = compute_live(program);

    for (index, block) in program.blocks.iter().enumerate() {
        let mut regs = [0_u32; REG_FILE_BYTES];

        for id in live.live_in[index].iter() {
            let id = id as u32;
            if let (Some(reg), Some(rc)) = (c.reg_of(id), program.temp_rc(id)) {
                fill(&mut regs, reg, rc.bytes(), id);
            }
        }
        let blocked = phi_sgpr_ops(program, index);
        for &id in &blocked {
            if let (Some(reg), Some(rc)) = (c.reg_of(id), program.temp_rc(id)) {
                fill(&mut regs, reg, rc.bytes(), id);
            }
        }

        for instr in &block.instructions {
            if instr.opcode == Opcode::PLogicalEnd {
                for &id in &blocked {
                    if let (Some(reg), Some(rc)) = (c.reg_of(id), program.temp_rc(id)) {
                        clear(&mut regs, reg, rc.bytes());
                    }
                }
            }

            // Phi operands reference predecessor end state, not this block.
            if !instr.is_phi() {
                for op in &instr.operands {
                    let Some(temp) = op.as_temp() else { continue };
                    let Some(reg) = op.phys_reg() else { continue };
                    let lo = reg.reg_b() as usize;
                    let hi = lo + temp.reg_class().bytes() as usize;
                    if hi > REG_FILE_BYTES {
                        continue;
                    }
                    for (offset, &occupant) in regs[lo..hi].iter().enumerate() {
                        if occupant != temp.id() {
                            c.err(
                                block.index,
                                Some(instr),
                                format!(
                                    "operand %{} expects {} at {} but found %{}",
                                    temp.id(),
                                    temp.id(),
                                    reg.advance(offset as u32),
                                    occupant
                                ),
                            );
                            break;
                        }
                    }
                }
            }

            for op in &instr.operands {
                if !op.is_first_kill_before_def() {
                    continue;
                }
                if let (Some(temp), Some(reg)) = (op.as_temp(), op.phys_reg()) {
                    clear(&mut regs, reg, temp.reg_class().bytes());
                }
            }

            for (i, def) in instr.definitions.iter().enumerate() {
                let Some(reg) = def.phys_reg() else { continue };
                let id = def.temp_id();
                let db = def.bytes();
                let written = bytes_written(program, instr, i);
                let (lo, hi) = if written <= db {
                    (reg.reg_b(), reg.reg_b() + db)
                } else {
                    (reg.reg_b() / 4 * 4, (reg.reg_b() + db).next_multiple_of(4))
                };
                if hi as usize > REG_FILE_BYTES {
                    c.err(
                        block.index,
                        Some(instr),
                        format!("definition %{id} extends past the register file"),
                    );
                    continue;
                }
                for byte in lo..hi {
                    let occupant = regs[byte as usize];
                    if occupant == 0 || occupant == id {
                        continue;
                    }
                    let own = byte >= reg.reg_b() && byte < reg.reg_b() + db;
                    if own {
                        c.err(
                            block.index,
                            Some(instr),
                            format!(
                                "definition %{id} at {} overlaps live value %{occupant}",
                                reg
                            ),
                        );
                        break;
                    }
                    if !partial_write_preserves(program.gfx_level, instr, reg.byte(), written)
                    {
                        c.err(
                            block.index,
                            Some(instr),
                            format!(
                                "partial write of %{id} at {} clobbers %{occupant}",
                                reg
                            ),
                        );
                        break;
                    }
                }
                fill(&mut regs, reg, db, id);
                // A definition with no later use frees its bytes right away.
                if def.is_kill() {
                    clear(&mut regs, reg, db);
                }
            }

            for op in &instr.operands {
                if !op.is_late_kill() || !op.is_first_kill() {
                    continue;
                }
                if let (Some(temp), Some(reg)) = (op.as_temp(), op.phys_reg()) {
                    clear(&mut regs, reg, temp.reg_class().bytes());
                }
            }
        }
    }

    c.valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProgramBuilder;
    use crate::diag::BufferSink;
    use crate::ir::{BlockKind, CompilationProgress, Definition, GfxLevel, Operand};
    use crate::reg::RegClass;
    use alloc::vec;

    fn run(program: &Program) -> (bool, BufferSink) {
        let mut sink = BufferSink::default();
        let ok = validate_ra(program, &mut sink);
        (ok, sink)
    }

    fn base() -> ProgramBuilder {
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        b.set_progress(CompilationProgress::AfterRa);
        b.create_block(BlockKind::TOP_LEVEL);
        b
    }

    #[test]
    fn clean_assignment_passes() {
        let mut b = base();
        let t0 = b.new_temp(RegClass::V1);
        let t1 = b.new_temp(RegClass::V1);
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 1)],
                vec![Definition::new(t0).fixed(PhysReg::vgpr(0))],
            ),
        );
        b.push(
            0,
            Instruction::new(
                Opcode::VAddF32,
                vec![
                    Operand::temp(t0).fixed(PhysReg::vgpr(0)).kill(),
                    Operand::temp(t0).fixed(PhysReg::vgpr(0)),
                ],
                vec![Definition::new(t1).fixed(PhysReg::vgpr(1)).kill()],
            ),
        );
        let (ok, sink) = run(&b.build());
        assert!(ok, "{:?}", sink.findings);
    }

    #[test]
    fn overlap_names_both_temps() {
        let mut b = base();
        let t0 = b.new_temp(RegClass::V1);
        let t1 = b.new_temp(RegClass::V1);
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 1)],
                vec![Definition::new(t0).fixed(PhysReg::vgpr(0))],
            ),
        );
        // t0 still live, yet t1 lands on the same register.
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 2)],
                vec![Definition::new(t1).fixed(PhysReg::vgpr(0))],
            ),
        );
        let sum = b.new_temp(RegClass::V1);
        b.push(
            0,
            Instruction::new(
                Opcode::VAddF32,
                vec![
                    Operand::temp(t0).fixed(PhysReg::vgpr(0)).kill(),
                    Operand::temp(t1).fixed(PhysReg::vgpr(0)).kill(),
                ],
                vec![Definition::new(sum).fixed(PhysReg::vgpr(1)).kill()],
            ),
        );
        let (ok, sink) = run(&b.build());
        assert!(!ok);
        assert!(
            sink.findings
                .iter()
                .any(|f| f.message.contains("%2") && f.message.contains("%1"))
        );
    }

    #[test]
    fn missing_assignment_is_reported() {
        let mut b = base();
        let t0 = b.new_temp(RegClass::V1);
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 1)],
                vec![Definition::new(t0)],
            ),
        );
        let (ok, sink) = run(&b.build());
        assert!(!ok);
        assert!(
            sink.findings
                .iter()
                .any(|f| f.message.contains("no register assigned"))
        );
    }

    #[test]
    fn inconsistent_assignment_names_both_locations() {
        let mut b = base();
        let t0 = b.new_temp(RegClass::V1);
        let t1 = b.new_temp(RegClass::V1);
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 1)],
                vec![Definition::new(t0).fixed(PhysReg::vgpr(2))],
            ),
        );
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::temp(t0).fixed(PhysReg::vgpr(3)).kill()],
                vec![Definition::new(t1).fixed(PhysReg::vgpr(4)).kill()],
            ),
        );
        let (ok, sink) = run(&b.build());
        assert!(!ok);
        assert!(
            sink.findings
                .iter()
                .any(|f| f.message.contains("v3") && f.message.contains("v2"))
        );
    }

    #[test]
    fn misaligned_vector_pair_is_reported() {
        let mut b = base();
        let lo = b.new_temp(RegClass::V1);
        let hi = b.new_temp(RegClass::V1);
        let vec2 = b.new_temp(RegClass::V2);
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 1)],
                vec![Definition::new(lo).fixed(PhysReg::vgpr(3))],
            ),
        );
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 2)],
                vec![Definition::new(hi).fixed(PhysReg::vgpr(5))],
            ),
        );
        // v3 and v5 cannot form the contiguous pair the vector needs.
        b.push(
            0,
            Instruction::new(
                Opcode::PCreateVector,
                vec![
                    Operand::temp(lo).fixed(PhysReg::vgpr(3)).kill().vector_aligned(),
                    Operand::temp(hi).fixed(PhysReg::vgpr(5)).kill(),
                ],
                vec![Definition::new(vec2).fixed(PhysReg::vgpr(3)).kill()],
            ),
        );
        let (ok, sink) = run(&b.build());
        assert!(!ok);
        assert!(
            sink.findings
                .iter()
                .any(|f| f.message.contains("not contiguous"))
        );
    }

    #[test]
    fn vcc_requires_reservation() {
        let mut b = base();
        let mask = b.new_temp(RegClass::lane_mask(64));
        let t = b.new_temp(RegClass::V1);
        b.push(
            0,
            Instruction::new(
                Opcode::VCmpEqF32,
                vec![
                    Operand::constant(4, 0).fixed(PhysReg::vgpr(0)),
                    Operand::constant(4, 0).fixed(PhysReg::vgpr(1)),
                ],
                vec![Definition::new(mask).fixed(crate::reg::VCC)],
            ),
        );
        b.push(
            0,
            Instruction::new(
                Opcode::VCndmaskB32,
                vec![
                    Operand::constant(4, 1),
                    Operand::constant(4, 2),
                    Operand::temp(mask).fixed(crate::reg::VCC).kill(),
                ],
                vec![Definition::new(t).fixed(PhysReg::vgpr(0)).kill()],
            ),
        );
        let (ok, sink) = run(&b.build());
        assert!(!ok);
        assert!(sink.findings.iter().any(|f| f.message.contains("vcc")));

        let mut b2 = base();
        b2.set_needs_vcc(true);
        let mask = b2.new_temp(RegClass::lane_mask(64));
        let t = b2.new_temp(RegClass::V1);
        b2.push(
            0,
            Instruction::new(
                Opcode::VCmpEqF32,
                vec![
                    Operand::constant(4, 0).fixed(PhysReg::vgpr(0)),
                    Operand::constant(4, 0).fixed(PhysReg::vgpr(1)),
                ],
                vec![Definition::new(mask).fixed(crate::reg::VCC)],
            ),
        );
        b2.push(
            0,
            Instruction::new(
                Opcode::VCndmaskB32,
                vec![
                    Operand::constant(4, 1),
                    Operand::constant(4, 2),
                    Operand::temp(mask).fixed(crate::reg::VCC).kill(),
                ],
                vec![Definition::new(t).fixed(PhysReg::vgpr(0)).kill()],
            ),
        );
        let (ok, sink) = run(&b2.build());
        assert!(ok, "{:?}", sink.findings);
    }

    #[test]
    fn scalar_budget_bypass_follows_the_device_carve_out() {
        // s103 is past the allocatable budget but below the fixed-register
        // carve-out, so it is an error.
        let mut b = base();
        let t = b.new_temp(RegClass::S1);
        b.push(
            0,
            Instruction::new(
                Opcode::SMovB32,
                vec![Operand::constant(4, 1)],
                vec![Definition::new(t).fixed(PhysReg::sgpr(103)).kill()],
            ),
        );
        let (ok, sink) = run(&b.build());
        assert!(!ok);
        assert!(
            sink.findings
                .iter()
                .any(|f| f.message.contains("sgpr budget"))
        );

        // m0 sits above the carve-out and is always addressable.
        let mut b2 = base();
        let t = b2.new_temp(RegClass::S1);
        b2.push(
            0,
            Instruction::new(
                Opcode::SMovB32,
                vec![Operand::constant(4, 1)],
                vec![Definition::new(t).fixed(crate::reg::M0).kill()],
            ),
        );
        let (ok, sink) = run(&b2.build());
        assert!(ok, "{:?}", sink.findings);
    }

    #[test]
    fn tied_definition_must_reuse_operand_register() {
        let mut b = base();
        let acc = b.new_temp(RegClass::V1);
        let out = b.new_temp(RegClass::V1);
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 0)],
                vec![Definition::new(acc).fixed(PhysReg::vgpr(2))],
            ),
        );
        b.push(
            0,
            Instruction::new(
                Opcode::VMacF32,
                vec![
                    Operand::constant(4, 1).fixed(PhysReg::vgpr(0)),
                    Operand::constant(4, 2).fixed(PhysReg::vgpr(1)),
                    Operand::temp(acc).fixed(PhysReg::vgpr(2)).kill(),
                ],
                vec![Definition::new(out).fixed(PhysReg::vgpr(3)).kill()],
            ),
        );
        let (ok, sink) = run(&b.build());
        assert!(!ok);
        assert!(
            sink.findings
                .iter()
                .any(|f| f.message.contains("must reuse"))
        );
    }
}
