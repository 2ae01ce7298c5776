// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Liveness and register-demand analysis.
//!
//! A backward fixpoint over both control flow graphs at once. Phi semantics
//! follow the edge they select over: a phi definition is consumed in its own
//! block, while each phi operand becomes live at the end of the predecessor
//! it belongs to, never inside the phi's block.

use alloc::vec;
use alloc::vec::Vec;

use crate::analysis::bitset::BitSet;
use crate::ir::{EdgeKind, Program};
use crate::opcode::Opcode;
use crate::reg::{DeviceLimits, RegisterDemand};

/// Maximum wavefronts per SIMD the occupancy model assumes.
const MAX_WAVES: u32 = 16;

/// The full result of a liveness run over a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Liveness {
    /// Per block, the set of temporaries live on entry.
    pub live_in: Vec<BitSet>,
    /// Per block, the peak register demand anywhere in the block.
    pub block_demand: Vec<RegisterDemand>,
    /// Per block, the register demand of the live-in set alone.
    pub live_in_demand: Vec<RegisterDemand>,
    /// Per block and instruction, the demand while that instruction
    /// executes (maximum of the demand just before and just after it).
    pub instr_demand: Vec<Vec<RegisterDemand>>,
    /// Peak demand over the whole program.
    pub max_demand: RegisterDemand,
    /// Wavefronts per SIMD the peak demand still allows.
    pub num_waves: u32,
}

/// Wavefronts per SIMD that fit under `demand` on `limits`.
#[must_use]
pub fn waves_for(limits: &DeviceLimits, demand: RegisterDemand) -> u32 {
    let by_vgpr = if demand.vgpr == 0 {
        MAX_WAVES
    } else {
        limits.num_vgprs / demand.vgpr.next_multiple_of(4)
    };
    let by_sgpr = if demand.sgpr == 0 {
        MAX_WAVES
    } else {
        limits.num_sgprs / demand.sgpr.next_multiple_of(8)
    };
    by_vgpr.min(by_sgpr).min(MAX_WAVES).max(1)
}

/// Runs the analysis from scratch. The result is deterministic for a given
/// program, which is what lets a cached copy be diffed against a fresh one.
#[must_use]
pub fn compute_live(program: &Program) -> Liveness {
    let num_blocks = program.blocks.len();
    let num_temps = program.temp_count();
    let mut live_in = vec![BitSet::new_empty(num_temps); num_blocks];
    let mut block_demand = vec![RegisterDemand::default(); num_blocks];
    let mut live_in_demand = vec![RegisterDemand::default(); num_blocks];
    let mut instr_demand: Vec<Vec<RegisterDemand>> = program
        .blocks
        .iter()
        .map(|b| vec![RegisterDemand::default(); b.instructions.len()])
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for index in (0..num_blocks).rev() {
            let (new_in, new_block, new_instr) =
                process_block(program, &live_in, index);
            if new_in != live_in[index] {
                changed = true;
            }
            live_in_demand[index] = demand_of(program, &new_in);
            live_in[index] = new_in;
            block_demand[index] = new_block;
            instr_demand[index] = new_instr;
        }
    }

    let mut max_demand = RegisterDemand::default();
    for &d in &block_demand {
        max_demand = max_demand.max_with(d);
    }
    let num_waves = waves_for(&program.limits, max_demand);

    Liveness {
        live_in,
        block_demand,
        live_in_demand,
        instr_demand,
        max_demand,
        num_waves,
    }
}

fn demand_of(program: &Program, set: &BitSet) -> RegisterDemand {
    let mut demand = RegisterDemand::default();
    for id in set.iter() {
        if let Some(rc) = program.temp_rc(id as u32) {
            demand.grow(rc);
        }
    }
    demand
}

/// Live set at the end of `index`: union of successor live-ins over both
/// edge kinds, plus the phi operands the successors select along edges
/// from this block.
fn live_out(program: &Program, live_in: &[BitSet], index: usize) -> BitSet {
    let block = &program.blocks[index];
    let mut out = BitSet::new_empty(program.temp_count());
    for kind in [EdgeKind::Logical, EdgeKind::Linear] {
        for &succ in block.succs(kind) {
            out.union_with(&live_in[succ as usize]);
            let sblock = &program.blocks[succ as usize];
            for instr in &sblock.instructions {
                if !instr.is_phi() {
                    break;
                }
                let phi_kind = if instr.opcode == Opcode::PPhi {
                    EdgeKind::Logical
                } else {
                    EdgeKind::Linear
                };
                if phi_kind != kind {
                    continue;
                }
                let Some(pos) = sblock
                    .preds(phi_kind)
                    .iter()
                    .position(|&p| p as usize == index)
                else {
                    continue;
                };
                if let Some(op) = instr.operands.get(pos) {
                    if let Some(temp) = op.as_temp() {
                        out.set(temp.id() as usize);
                    }
                }
            }
        }
    }
    out
}

fn process_block(
    program: &Program,
    live_in: &[BitSet],
    index: usize,
) -> (BitSet, RegisterDemand, Vec<RegisterDemand>) {
    let block = &program.blocks[index];
    let mut live = live_out(program, live_in, index);
    let mut demand = demand_of(program, &live);
    let mut block_demand = demand;
    let mut instr_demand = vec![RegisterDemand::default(); block.instructions.len()];

    for (i, instr) in block.instructions.iter().enumerate().rev() {
        let after = demand;
        for def in &instr.definitions {
            let id = def.temp_id() as usize;
            if live.get(id) {
                live.clear(id);
                demand.shrink(def.reg_class());
            }
        }
        if !instr.is_phi() {
            for op in &instr.operands {
                if let Some(temp) = op.as_temp() {
                    let id = temp.id() as usize;
                    if !live.get(id) {
                        live.set(id);
                        demand.grow(temp.reg_class());
                    }
                }
            }
        }
        instr_demand[i] = after.max_with(demand);
        block_demand = block_demand.max_with(instr_demand[i]);
    }

    (live, block_demand, instr_demand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProgramBuilder;
    use crate::ir::{BlockKind, Definition, GfxLevel, Instruction, Operand};
    use crate::reg::RegClass;

    #[test]
    fn straight_line_demand() {
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        let bb = b.create_block(BlockKind::TOP_LEVEL);
        let t0 = b.new_temp(RegClass::V1);
        let t1 = b.new_temp(RegClass::V1);
        b.push(
            bb,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 1)],
                vec![Definition::new(t0)],
            ),
        );
        b.push(
            bb,
            Instruction::new(
                Opcode::VAddF32,
                vec![Operand::temp(t0), Operand::temp(t0)],
                vec![Definition::new(t1)],
            ),
        );
        b.push(bb, Instruction::new(Opcode::SEndpgm, vec![], vec![]));
        let program = b.build();
        let live = compute_live(&program);
        assert!(live.live_in[0].iter().next().is_none());
        // t0 and t1 overlap across the add.
        assert_eq!(live.max_demand.vgpr, 2);
        assert_eq!(live.max_demand.sgpr, 0);
        assert_eq!(live.num_waves, MAX_WAVES);
    }

    #[test]
    fn phi_operands_live_out_of_predecessors_only() {
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        for _ in 0..4 {
            b.create_block(BlockKind::NONE);
        }
        for (from, to) in [(0, 1), (0, 2), (1, 3), (2, 3)] {
            b.add_logical_edge(from, to);
            b.add_linear_edge(from, to);
        }
        let a = b.new_temp(RegClass::V1);
        let c = b.new_temp(RegClass::V1);
        let d = b.new_temp(RegClass::V1);
        b.push(
            0,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 1)],
                vec![Definition::new(a)],
            ),
        );
        b.push(
            1,
            Instruction::new(
                Opcode::VMovB32,
                vec![Operand::constant(4, 2)],
                vec![Definition::new(c)],
            ),
        );
        b.push(
            3,
            Instruction::new(
                Opcode::PPhi,
                vec![Operand::temp(c), Operand::temp(a)],
                vec![Definition::new(d)],
            ),
        );
        let program = b.build();
        let live = compute_live(&program);
        // a flows to block 3 through block 2 only, c through block 1 only.
        assert!(live.live_in[2].get(a.id() as usize));
        assert!(!live.live_in[1].get(a.id() as usize));
        assert!(!live.live_in[3].get(c.id() as usize));
        assert!(!live.live_in[3].get(a.id() as usize));
    }

    #[test]
    fn recomputation_is_deterministic() {
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        let bb = b.create_block(BlockKind::TOP_LEVEL);
        let t = b.new_temp(RegClass::S1);
        b.push(
            bb,
            Instruction::new(
                Opcode::SMovB32,
                vec![Operand::constant(4, 7)],
                vec![Definition::new(t)],
            ),
        );
        let program = b.build();
        assert_eq!(compute_live(&program), compute_live(&program));
    }
}
