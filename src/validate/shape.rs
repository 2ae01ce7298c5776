// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control flow shape validation.
//!
//! Checks properties of the block graph itself, independent of the
//! instructions inside: index consistency, sorted adjacency lists, and the
//! absence of critical edges in either graph. An edge is critical when its
//! source has several successors and its destination several predecessors
//! of the same kind; later phases insert copies on edges and need somewhere
//! unambiguous to put them.

use alloc::format;

use crate::diag::{DiagnosticSink, Finding, FindingKind};
use crate::ir::{EdgeKind, Program};

fn edge_kind_name(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Logical => "logical",
        EdgeKind::Linear => "linear",
    }
}

struct Checker<'a> {
    sink: &'a mut dyn DiagnosticSink,
    valid: bool,
}

impl Checker<'_> {
    fn check(&mut self, ok: bool, block: u32, message: alloc::string::String) {
        if !ok {
            self.valid = false;
            self.sink.report(Finding {
                kind: FindingKind::Structural,
                block,
                message,
                instr: None,
            });
        }
    }
}

/// Validates the shape of both control flow graphs.
#[must_use]
pub fn validate_cfg(program: &Program, sink: &mut dyn DiagnosticSink) -> bool {
    let mut c = Checker { sink, valid: true };

    for (position, block) in program.blocks.iter().enumerate() {
        c.check(
            block.index as usize == position,
            position as u32,
            format!(
                "block index {} does not match its position {}",
                block.index, position
            ),
        );

        for kind in [EdgeKind::Logical, EdgeKind::Linear] {
            for (name, list) in [("predecessor", block.preds(kind)), ("successor", block.succs(kind))] {
                let sorted = list.windows(2).all(|w| w[0] < w[1]);
                c.check(
                    sorted,
                    block.index,
                    format!(
                        "{} {} list of BB{} is not strictly ascending",
                        edge_kind_name(kind),
                        name,
                        block.index
                    ),
                );
                let in_range = list.iter().all(|&i| (i as usize) < program.blocks.len());
                c.check(
                    in_range,
                    block.index,
                    format!(
                        "{} {} list of BB{} references a block out of range",
                        edge_kind_name(kind),
                        name,
                        block.index
                    ),
                );
            }
        }
    }

    // Critical edges, per kind.
    for block in &program.blocks {
        for kind in [EdgeKind::Logical, EdgeKind::Linear] {
            if block.preds(kind).len() <= 1 {
                continue;
            }
            for &pred in block.preds(kind) {
                let Some(pred_block) = program.blocks.get(pred as usize) else {
                    continue;
                };
                c.check(
                    pred_block.succs(kind).len() == 1,
                    block.index,
                    format!(
                        "critical {} edge BB{} -> BB{}",
                        edge_kind_name(kind),
                        pred,
                        block.index
                    ),
                );
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
    use crate::ir::{BlockKind, GfxLevel};

    #[test]
    fn clean_diamond_passes() {
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        for _ in 0..4 {
            b.create_block(BlockKind::NONE);
        }
        for (from, to) in [(0, 1), (0, 2), (1, 3), (2, 3)] {
            b.add_linear_edge(from, to);
        }
        let program = b.build();
        let mut sink = BufferSink::default();
        assert!(validate_cfg(&program, &mut sink));
        assert!(sink.findings.is_empty());
    }

    #[test]
    fn critical_edge_is_reported_for_its_kind_only() {
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        for _ in 0..4 {
            b.create_block(BlockKind::NONE);
        }
        // BB1 -> BB3 is critical: BB1 has two successors, BB3 two preds.
        for (from, to) in [(0, 1), (1, 2), (1, 3), (2, 3)] {
            b.add_linear_edge(from, to);
        }
        let program = b.build();
        let mut sink = BufferSink::default();
        assert!(!validate_cfg(&program, &mut sink));
        let messages: alloc::vec::Vec<_> =
            sink.findings.iter().map(|f| f.message.as_str()).collect();
        assert!(messages.contains(&"critical linear edge BB1 -> BB3"));
        assert!(!messages.iter().any(|m| m.contains("logical")));
    }

    #[test]
    fn unsorted_adjacency_is_reported() {
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        for _ in 0..3 {
            b.create_block(BlockKind::NONE);
        }
        b.add_linear_edge(0, 1);
        b.add_linear_edge(0, 2);
        let mut program = b.build();
        program.blocks[0].linear_succs.swap(0, 1);
        let mut sink = BufferSink::default();
        assert!(!validate_cfg(&program, &mut sink));
        assert!(
            sink.findings
                .iter()
                .any(|f| f.message.contains("not strictly ascending"))
        );
    }

    #[test]
    fn index_mismatch_is_reported() {
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        b.create_block(BlockKind::NONE);
        b.create_block(BlockKind::NONE);
        let mut program = b.build();
        program.blocks[1].index = 5;
        let mut sink = BufferSink::default();
        assert!(!validate_cfg(&program, &mut sink));
    }
}
