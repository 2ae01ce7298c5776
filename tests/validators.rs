// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "integration test crate")]

use shader_ir::analysis::liveness::compute_live;
use shader_ir::builder::ProgramBuilder;
use shader_ir::diag::{BufferSink, FindingKind, ValidateMask, ValidationConfig};
use shader_ir::ir::{BlockKind, CompilationProgress, GfxLevel};
use shader_ir::reg::{PhysReg, RegClass};
use shader_ir::validate::validate;
use shader_ir::{Definition, Instruction, Opcode, Operand, Program};

fn run_all(program: &Program) -> (bool, BufferSink) {
    let mut sink = BufferSink::default();
    let ok = validate(program, &ValidationConfig::default(), &mut sink);
    (ok, sink)
}

fn diamond(edges_logical: bool) -> ProgramBuilder {
    let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
    b.create_block(BlockKind::TOP_LEVEL);
    for _ in 0..3 {
        b.create_block(BlockKind::NONE);
    }
    for (from, to) in [(0, 1), (0, 2), (1, 3), (2, 3)] {
        b.add_linear_edge(from, to);
        if edges_logical {
            b.add_logical_edge(from, to);
        }
    }
    b
}

fn mov(def: shader_ir::Temp, value: u64) -> Instruction {
    Instruction::new(
        Opcode::VMovB32,
        vec![Operand::constant(4, value)],
        vec![Definition::new(def)],
    )
}

#[test]
fn well_formed_diamond_passes_everything() {
    let mut b = diamond(true);
    let t1 = b.new_temp(RegClass::V1);
    let t2 = b.new_temp(RegClass::V1);
    let t3 = b.new_temp(RegClass::V1);
    let merged = b.new_temp(RegClass::V1);
    b.push(0, mov(t1, 1));
    b.push(1, mov(t2, 2));
    b.push(2, mov(t3, 3));
    b.push(
        3,
        Instruction::new(
            Opcode::PPhi,
            vec![Operand::temp(t2), Operand::temp(t3)],
            vec![Definition::new(merged)],
        ),
    );
    let sum = b.new_temp(RegClass::V1);
    b.push(
        3,
        Instruction::new(
            Opcode::VAddF32,
            vec![Operand::temp(merged), Operand::temp(t1)],
            vec![Definition::new(sum)],
        ),
    );
    b.push(3, Instruction::new(Opcode::SEndpgm, vec![], vec![]));
    let mut program = b.build();
    program.live = Some(compute_live(&program));
    let (ok, sink) = run_all(&program);
    assert!(ok, "{:?}", sink.findings);
    assert!(sink.findings.is_empty());
}

#[test]
fn value_defined_in_one_branch_cannot_be_used_in_the_merge() {
    let mut b = diamond(true);
    let t1 = b.new_temp(RegClass::V1);
    let sum = b.new_temp(RegClass::V1);
    b.push(1, mov(t1, 1));
    b.push(
        3,
        Instruction::new(
            Opcode::VAddF32,
            vec![Operand::temp(t1), Operand::temp(t1)],
            vec![Definition::new(sum)],
        ),
    );
    let program = b.build();
    let mut sink = BufferSink::default();
    let ok = validate(
        &program,
        &ValidationConfig::new(ValidateMask::IR),
        &mut sink,
    );
    assert!(!ok);
    let finding = sink
        .findings
        .iter()
        .find(|f| f.kind == FindingKind::Ssa)
        .expect("an ssa finding");
    assert!(finding.message.contains("%1"));
    assert!(finding.message.contains("dominate"));
    assert_eq!(finding.block, 3);
}

#[test]
fn critical_edge_between_branch_and_merge_is_flagged() {
    // BB1 branches to both BB2 and BB3 while BB3 also merges BB2.
    let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
    b.create_block(BlockKind::TOP_LEVEL);
    for _ in 0..3 {
        b.create_block(BlockKind::NONE);
    }
    for (from, to) in [(0, 1), (1, 2), (1, 3), (2, 3)] {
        b.add_linear_edge(from, to);
    }
    let program = b.build();
    let mut sink = BufferSink::default();
    let ok = validate(
        &program,
        &ValidationConfig::new(ValidateMask::CFG),
        &mut sink,
    );
    assert!(!ok);
    assert!(
        sink.findings
            .iter()
            .any(|f| f.message == "critical linear edge BB1 -> BB3")
    );
}

#[test]
fn redefining_a_temporary_reports_its_name_once_per_extra_def() {
    let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
    b.create_block(BlockKind::TOP_LEVEL);
    // Allocate up to %7 so the finding names a mid-range temporary.
    let mut last = b.new_temp(RegClass::V1);
    for _ in 0..6 {
        last = b.new_temp(RegClass::V1);
    }
    b.push(0, mov(last, 1));
    b.push(0, mov(last, 2));
    let program = b.build();
    let mut sink = BufferSink::default();
    let ok = validate(
        &program,
        &ValidationConfig::new(ValidateMask::IR),
        &mut sink,
    );
    assert!(!ok);
    let dups: Vec<_> = sink
        .findings
        .iter()
        .filter(|f| f.message == "temporary %7 defined twice")
        .collect();
    assert_eq!(dups.len(), 1);
    assert_eq!(dups[0].kind, FindingKind::Ssa);
    assert!(dups[0].instr.is_some());
}

#[test]
fn overlapping_assignment_names_both_values() {
    let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
    b.set_progress(CompilationProgress::AfterRa);
    b.create_block(BlockKind::TOP_LEVEL);
    let t1 = b.new_temp(RegClass::V1);
    let t2 = b.new_temp(RegClass::V1);
    let t3 = b.new_temp(RegClass::V1);
    b.push(
        0,
        Instruction::new(
            Opcode::VMovB32,
            vec![Operand::constant(4, 1)],
            vec![Definition::new(t1).fixed(PhysReg::vgpr(0))],
        ),
    );
    b.push(
        0,
        Instruction::new(
            Opcode::VMovB32,
            vec![Operand::constant(4, 2)],
            vec![Definition::new(t2).fixed(PhysReg::vgpr(0))],
        ),
    );
    b.push(
        0,
        Instruction::new(
            Opcode::VAddF32,
            vec![
                Operand::temp(t1).fixed(PhysReg::vgpr(0)).kill(),
                Operand::temp(t2).fixed(PhysReg::vgpr(0)).kill(),
            ],
            vec![Definition::new(t3).fixed(PhysReg::vgpr(1)).kill()],
        ),
    );
    let program = b.build();
    let mut sink = BufferSink::default();
    let ok = validate(
        &program,
        &ValidationConfig::new(ValidateMask::RA),
        &mut sink,
    );
    assert!(!ok);
    assert!(
        sink.findings
            .iter()
            .any(|f| f.kind == FindingKind::Allocation
                && f.message.contains("%2")
                && f.message.contains("%1"))
    );
}

#[test]
fn vector_build_requires_contiguous_registers() {
    let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
    b.set_progress(CompilationProgress::AfterRa);
    b.create_block(BlockKind::TOP_LEVEL);
    let lo = b.new_temp(RegClass::V1);
    let hi = b.new_temp(RegClass::V1);
    let pair = b.new_temp(RegClass::V2);
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
    b.push(
        0,
        Instruction::new(
            Opcode::PCreateVector,
            vec![
                Operand::temp(lo)
                    .fixed(PhysReg::vgpr(3))
                    .kill()
                    .vector_aligned(),
                Operand::temp(hi).fixed(PhysReg::vgpr(5)).kill(),
            ],
            vec![Definition::new(pair).fixed(PhysReg::vgpr(3)).kill()],
        ),
    );
    let program = b.build();
    let mut sink = BufferSink::default();
    let ok = validate(
        &program,
        &ValidationConfig::new(ValidateMask::RA),
        &mut sink,
    );
    assert!(!ok);
    assert!(
        sink.findings
            .iter()
            .any(|f| f.message.contains("v3") && f.message.contains("not contiguous"))
    );
}

#[test]
fn validators_never_mutate_the_program() {
    let mut b = diamond(true);
    let t = b.new_temp(RegClass::V1);
    b.push(1, mov(t, 1));
    let mut program = b.build();
    program.live = Some(compute_live(&program));
    let before = program.clone();
    let mut sink = BufferSink::default();
    let _ = validate(&program, &ValidationConfig::default(), &mut sink);
    assert_eq!(program, before);
}

#[test]
fn validation_is_deterministic() {
    let mut b = diamond(true);
    let t1 = b.new_temp(RegClass::V1);
    let sum = b.new_temp(RegClass::V1);
    b.push(1, mov(t1, 1));
    b.push(
        3,
        Instruction::new(
            Opcode::VAddF32,
            vec![Operand::temp(t1), Operand::temp(t1)],
            vec![Definition::new(sum)],
        ),
    );
    let program = b.build();
    let (_, first) = run_all(&program);
    let (_, second) = run_all(&program);
    assert_eq!(first.findings, second.findings);
    assert!(!first.findings.is_empty());
}

#[test]
fn mask_gates_which_validators_run() {
    // The program has a critical edge but nothing else wrong.
    let mut b = ProgramBuilder::new(GfxLevel::Gfx10, 64);
    b.create_block(BlockKind::TOP_LEVEL);
    for _ in 0..3 {
        b.create_block(BlockKind::NONE);
    }
    for (from, to) in [(0, 1), (1, 2), (1, 3), (2, 3)] {
        b.add_linear_edge(from, to);
    }
    let program = b.build();

    let mut sink = BufferSink::default();
    assert!(validate(
        &program,
        &ValidationConfig::new(ValidateMask::IR),
        &mut sink
    ));
    assert!(sink.findings.is_empty());

    let mut sink = BufferSink::default();
    assert!(!validate(
        &program,
        &ValidationConfig::new(ValidateMask::IR | ValidateMask::CFG),
        &mut sink
    ));
    assert!(!sink.findings.is_empty());
}

#[test]
fn ra_validation_waits_for_allocation() {
    // No registers assigned anywhere; before allocation that is fine.
    let mut b = diamond(true);
    let t = b.new_temp(RegClass::V1);
    b.push(0, mov(t, 1));
    let program = b.build();
    let mut sink = BufferSink::default();
    assert!(validate(
        &program,
        &ValidationConfig::new(ValidateMask::RA),
        &mut sink
    ));
    assert!(sink.findings.is_empty());
}

#[test]
fn stale_liveness_cache_is_detected_end_to_end() {
    let mut b = diamond(true);
    let t = b.new_temp(RegClass::V1);
    let u = b.new_temp(RegClass::V1);
    b.push(0, mov(t, 1));
    b.push(
        3,
        Instruction::new(
            Opcode::VAddF32,
            vec![Operand::temp(t), Operand::temp(t)],
            vec![Definition::new(u)],
        ),
    );
    let mut program = b.build();
    let mut snapshot = compute_live(&program);
    // Drop %1 from the live-in of the merge block behind the cache's back.
    snapshot.live_in[3].clear(1);
    program.live = Some(snapshot);
    let mut sink = BufferSink::default();
    let ok = validate(
        &program,
        &ValidationConfig::new(ValidateMask::LIVE),
        &mut sink,
    );
    assert!(!ok);
    assert!(
        sink.findings
            .iter()
            .any(|f| f.kind == FindingKind::Liveness && f.message.contains("missing: %1"))
    );
}

#[test]
fn phi_reads_reach_back_into_their_predecessors() {
    // %1 is consumed by the merge phi. Liveness must see it live out of
    // both branches but not live into the merge block itself.
    let mut b = diamond(true);
    let t = b.new_temp(RegClass::V1);
    let d = b.new_temp(RegClass::V1);
    b.push(0, mov(t, 1));
    b.push(
        3,
        Instruction::new(
            Opcode::PPhi,
            vec![Operand::temp(t), Operand::temp(t)],
            vec![Definition::new(d)],
        ),
    );
    let sum = b.new_temp(RegClass::V1);
    b.push(
        3,
        Instruction::new(
            Opcode::VAddF32,
            vec![Operand::temp(d), Operand::temp(d)],
            vec![Definition::new(sum)],
        ),
    );
    let program = b.build();
    let live = compute_live(&program);
    assert!(live.live_in[1].get(1));
    assert!(live.live_in[2].get(1));
    assert!(!live.live_in[3].get(1));
    let (ok, sink) = {
        let mut program = program;
        program.live = Some(live);
        run_all(&program)
    };
    assert!(ok, "{:?}", sink.findings);
}
