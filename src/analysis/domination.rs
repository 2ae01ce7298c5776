// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dominator trees over either control flow graph.
//!
//! Built with the iterative Cooper/Harvey/Kennedy scheme: a reverse postorder
//! numbering followed by an idom intersection fixpoint. Queries climb the
//! idom chain, bounded by the ordering, so both construction and lookup stay
//! non-recursive no matter how deep the graph is.

use alloc::vec;
use alloc::vec::Vec;

use crate::ir::{EdgeKind, Program};

const UNREACHABLE: u32 = u32::MAX;

/// Dominator tree for one edge kind of a program.
#[derive(Clone, Debug)]
pub struct DomTree {
    /// Immediate dominator per block; the entry points at itself and
    /// unreachable blocks hold [`u32::MAX`].
    idom: Vec<u32>,
    /// Reverse postorder rank per block; [`u32::MAX`] for unreachable ones.
    order: Vec<u32>,
}

impl DomTree {
    /// Builds the dominator tree over the `kind` edges of `program`,
    /// starting from block 0.
    #[must_use]
    pub fn build(program: &Program, kind: EdgeKind) -> Self {
        let n = program.blocks.len();
        let mut order = vec![UNREACHABLE; n];
        let mut idom = vec![UNREACHABLE; n];
        if n == 0 {
            return Self { idom, order };
        }

        // Iterative depth-first postorder from the entry block.
        let mut postorder = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        let mut stack: Vec<(u32, usize)> = vec![(0, 0)];
        visited[0] = true;
        while let Some(frame) = stack.last_mut() {
            let (block, next) = *frame;
            let succs = program.blocks[block as usize].succs(kind);
            if next < succs.len() {
                frame.1 += 1;
                let s = succs[next];
                if !visited[s as usize] {
                    visited[s as usize] = true;
                    stack.push((s, 0));
                }
            } else {
                postorder.push(block);
                stack.pop();
            }
        }
        let rpo: Vec<u32> = postorder.into_iter().rev().collect();
        for (rank, &block) in rpo.iter().enumerate() {
            order[block as usize] = rank as u32;
        }

        idom[0] = 0;
        let mut changed = true;
        while changed {
            changed = false;
            for &block in rpo.iter().skip(1) {
                let mut new_idom = UNREACHABLE;
                for &pred in program.blocks[block as usize].preds(kind) {
                    // Only predecessors with a settled idom participate.
                    if idom[pred as usize] == UNREACHABLE {
                        continue;
                    }
                    new_idom = if new_idom == UNREACHABLE {
                        pred
                    } else {
                        intersect(new_idom, pred, &idom, &order)
                    };
                }
                if new_idom != UNREACHABLE && idom[block as usize] != new_idom {
                    idom[block as usize] = new_idom;
                    changed = true;
                }
            }
        }

        Self { idom, order }
    }

    /// Whether block `a` dominates block `b`. Every block dominates itself;
    /// unreachable blocks dominate nothing and are dominated by nothing
    /// besides themselves.
    #[must_use]
    pub fn dominates(&self, a: u32, b: u32) -> bool {
        if a == b {
            return true;
        }
        let rank_a = self.order[a as usize];
        if rank_a == UNREACHABLE || self.order[b as usize] == UNREACHABLE {
            return false;
        }
        let mut b = b;
        while self.order[b as usize] > rank_a {
            b = self.idom[b as usize];
        }
        b == a
    }

    /// The immediate dominator of `block`, if it is reachable. The entry
    /// block is its own immediate dominator.
    #[must_use]
    pub fn idom(&self, block: u32) -> Option<u32> {
        match self.idom.get(block as usize) {
            Some(&i) if i != UNREACHABLE => Some(i),
            _ => None,
        }
    }
}

fn intersect(mut a: u32, mut b: u32, idom: &[u32], order: &[u32]) -> u32 {
    while a != b {
        while order[a as usize] > order[b as usize] {
            a = idom[a as usize];
        }
        while order[b as usize] > order[a as usize] {
            b = idom[b as usize];
        }
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProgramBuilder;
    use crate::ir::{BlockKind, GfxLevel};

    fn diamond() -> Program {
        // 0 -> {1, 2} -> 3, linear edges only.
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        for _ in 0..4 {
            b.create_block(BlockKind::NONE);
        }
        b.add_linear_edge(0, 1);
        b.add_linear_edge(0, 2);
        b.add_linear_edge(1, 3);
        b.add_linear_edge(2, 3);
        b.build()
    }

    #[test]
    fn diamond_join_is_dominated_by_the_fork() {
        let program = diamond();
        let dom = DomTree::build(&program, EdgeKind::Linear);
        assert!(dom.dominates(0, 3));
        assert!(!dom.dominates(1, 3));
        assert!(!dom.dominates(2, 3));
        assert_eq!(dom.idom(3), Some(0));
        assert!(dom.dominates(2, 2));
    }

    #[test]
    fn edge_kinds_are_independent() {
        let program = diamond();
        // No logical edges at all, so only the entry is logically reachable.
        let dom = DomTree::build(&program, EdgeKind::Logical);
        assert!(!dom.dominates(0, 3));
        assert!(dom.dominates(3, 3));
        assert_eq!(dom.idom(3), None);
    }

    #[test]
    fn loop_back_edge_keeps_header_dominating() {
        let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
        for _ in 0..4 {
            b.create_block(BlockKind::NONE);
        }
        // 0 -> 1 -> 2 -> 1, 2 -> 3
        b.add_linear_edge(0, 1);
        b.add_linear_edge(1, 2);
        b.add_linear_edge(2, 1);
        b.add_linear_edge(2, 3);
        let program = b.build();
        let dom = DomTree::build(&program, EdgeKind::Linear);
        assert_eq!(dom.idom(1), Some(0));
        assert!(dom.dominates(1, 2));
        assert!(dom.dominates(1, 3));
        assert!(!dom.dominates(2, 1));
    }
}
