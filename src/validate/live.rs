// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Liveness cross-check.
//!
//! Recomputes liveness from scratch and diffs the result against the cached
//! copy a pass left on the program. The two results are kept as separate
//! immutable values the whole time; nothing is swapped into or out of the
//! program under validation.

use alloc::format;
use alloc::string::String;
use core::fmt::Write;

use crate::analysis::bitset::BitSet;
use crate::analysis::liveness::compute_live;
use crate::diag::{DiagnosticSink, Finding, FindingKind};
use crate::ir::Program;
use crate::print::instr_to_string;

fn report(sink: &mut dyn DiagnosticSink, block: u32, message: String, instr: Option<String>) {
    sink.report(Finding {
        kind: FindingKind::Liveness,
        block,
        message,
        instr,
    });
}

fn temp_list(only_in_a: &BitSet, other: &BitSet) -> String {
    let mut out = String::new();
    for id in only_in_a.iter().filter(|&id| !other.get(id)) {
        if !out.is_empty() {
            out.push_str(", ");
        }
        let _ = write!(out, "%{id}");
    }
    out
}

/// Compares the cached liveness against a fresh recomputation. A missing
/// cache is itself a finding.
#[must_use]
pub fn validate_live(program: &Program, sink: &mut dyn DiagnosticSink) -> bool {
    let Some(cached) = &program.live else {
        report(
            sink,
            0,
            String::from("no cached liveness to cross-check"),
            None,
        );
        return false;
    };
    let fresh = compute_live(program);
    let mut valid = true;

    if cached.live_in.len() != program.blocks.len() {
        valid = false;
        report(
            sink,
            0,
            format!(
                "liveness cache covers {} blocks, program has {}",
                cached.live_in.len(),
                program.blocks.len()
            ),
            None,
        );
    }

    for (index, block) in program.blocks.iter().enumerate() {
        // A cache from before blocks were added or removed has nothing to
        // compare here; the coverage finding above already flagged it.
        let Some(cached_in) = cached.live_in.get(index) else {
            continue;
        };
        let fresh_in = &fresh.live_in[index];
        if cached_in != fresh_in {
            valid = false;
            let missing = temp_list(fresh_in, cached_in);
            let stale = temp_list(cached_in, fresh_in);
            let mut message = String::from("live-in set differs from recomputation");
            if !missing.is_empty() {
                let _ = write!(message, "; missing: {missing}");
            }
            if !stale.is_empty() {
                let _ = write!(message, "; stale: {stale}");
            }
            report(sink, block.index, message, None);
        }

        let cached_in_demand = cached.live_in_demand.get(index).copied().unwrap_or_default();
        if cached_in_demand != fresh.live_in_demand[index] {
            valid = false;
            report(
                sink,
                block.index,
                format!(
                    "live-in demand {} differs from recomputed {}",
                    cached_in_demand, fresh.live_in_demand[index]
                ),
                None,
            );
        }

        let cached_block_demand = cached.block_demand.get(index).copied().unwrap_or_default();
        if cached_block_demand != fresh.block_demand[index] {
            valid = false;
            report(
                sink,
                block.index,
                format!(
                    "block demand {} differs from recomputed {}",
                    cached_block_demand, fresh.block_demand[index]
                ),
                None,
            );
        }

        for (i, instr) in block.instructions.iter().enumerate() {
            let cached_d = cached
                .instr_demand
                .get(index)
                .and_then(|v| v.get(i))
                .copied()
                .unwrap_or_default();
            let fresh_d = fresh.instr_demand[index][i];
            if cached_d != fresh_d {
                valid = false;
                report(
                    sink,
                    block.index,
                    format!(
                        "instruction demand {cached_d} differs from recomputed {fresh_d}"
                    ),
                    Some(instr_to_string(instr)),
                );
            }
        }
    }

    if cached.max_demand != fresh.max_demand {
        valid = false;
        report(
            sink,
            0,
            format!(
                "peak demand {} differs from recomputed {}",
                cached.max_demand, fresh.max_demand
            ),
            None,
        );
    }
    if cached.num_waves != fresh.num_waves {
        valid = false;
        report(
            sink,
            0,
            format!(
                "wave count {} differs from recomputed {}",
                cached.num_waves, fresh.num_waves
            ),
            None,
        );
    }

    valid
}
