// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Convenience builder for assembling programs in tests and frontends.

use alloc::vec::Vec;

use crate::analysis::liveness::Liveness;
use crate::ir::{
    Block, BlockKind, CompilationProgress, EdgeKind, GfxLevel, Instruction, Program,
};
use crate::reg::{DeviceLimits, RegClass};

/// Builds a [`Program`] block by block.
///
/// Temporary id 0 is reserved as a null id, so the first temporary created
/// is `%1`.
#[derive(Debug)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    #[must_use]
    pub fn new(gfx_level: GfxLevel, wave_size: u32) -> Self {
        let mut program = Program {
            blocks: Vec::new(),
            temp_rc: Vec::new(),
            gfx_level,
            wave_size,
            progress: CompilationProgress::AfterIsel,
            limits: DeviceLimits::default(),
            needs_vcc: false,
            live: None,
        };
        program.temp_rc.push(RegClass::S1); // placeholder for the null id
        Self { program }
    }

    /// Allocates a fresh temporary of class `rc`.
    pub fn new_temp(&mut self, rc: RegClass) -> crate::ir::Temp {
        let id = self.program.temp_rc.len() as u32;
        self.program.temp_rc.push(rc);
        crate::ir::Temp::new(id, rc)
    }

    /// Appends a new block and returns its index.
    pub fn create_block(&mut self, kind: BlockKind) -> u32 {
        let index = self.program.blocks.len() as u32;
        self.program.blocks.push(Block {
            index,
            kind,
            ..Block::default()
        });
        index
    }

    /// Adds an edge of the given kind, keeping both adjacency lists sorted.
    pub fn add_edge(&mut self, kind: EdgeKind, from: u32, to: u32) {
        match kind {
            EdgeKind::Logical => {
                let succs = &mut self.program.blocks[from as usize].logical_succs;
                if !succs.contains(&to) {
                    succs.push(to);
                    succs.sort_unstable();
                }
                let preds = &mut self.program.blocks[to as usize].logical_preds;
                if !preds.contains(&from) {
                    preds.push(from);
                    preds.sort_unstable();
                }
            }
            EdgeKind::Linear => {
                let succs = &mut self.program.blocks[from as usize].linear_succs;
                if !succs.contains(&to) {
                    succs.push(to);
                    succs.sort_unstable();
                }
                let preds = &mut self.program.blocks[to as usize].linear_preds;
                if !preds.contains(&from) {
                    preds.push(from);
                    preds.sort_unstable();
                }
            }
        }
    }

    /// Adds a logical edge.
    pub fn add_logical_edge(&mut self, from: u32, to: u32) {
        self.add_edge(EdgeKind::Logical, from, to);
    }

    /// Adds a linear edge.
    pub fn add_linear_edge(&mut self, from: u32, to: u32) {
        self.add_edge(EdgeKind::Linear, from, to);
    }

    /// Appends an instruction to `block`.
    pub fn push(&mut self, block: u32, instr: Instruction) {
        self.program.blocks[block as usize].instructions.push(instr);
    }

    /// Marks how far compilation has progressed.
    pub fn set_progress(&mut self, progress: CompilationProgress) {
        self.program.progress = progress;
    }

    /// Overrides the device limits.
    pub fn set_limits(&mut self, limits: DeviceLimits) {
        self.program.limits = limits;
    }

    /// Declares that the program reserves vcc.
    pub fn set_needs_vcc(&mut self, needs_vcc: bool) {
        self.program.needs_vcc = needs_vcc;
    }

    /// Attaches a cached liveness result.
    pub fn set_live(&mut self, live: Liveness) {
        self.program.live = Some(live);
    }

    /// Finishes the build.
    #[must_use]
    pub fn build(self) -> Program {
        self.program
    }
}
