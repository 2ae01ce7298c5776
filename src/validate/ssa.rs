// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural, single-assignment and encoding validation.
//!
//! One pass over every instruction checks it in isolation: opcode template,
//! register classes, bank discipline per format, SDWA and literal rules and
//! the pseudo-instruction contracts. A second pass checks the single
//! assignment property itself: every temporary has exactly one definition
//! and that definition dominates each use in the graph the value's class
//! lives in. Graph symmetry between predecessor and successor lists is
//! checked here too, before anything walks edges.

use alloc::format;
use alloc::string::String;

use hashbrown::HashMap;

use crate::analysis::domination::DomTree;
use crate::diag::{DiagnosticSink, Finding, FindingKind};
use crate::ir::{Block, BlockKind, CompilationProgress, EdgeKind, InstrExtra, Instruction, Program};
use crate::isa::{
    can_write_oversized_subdword, const_bus_limit, sdwa_supported, valu_scalar_mask,
    vop3_literal_supported,
};
use crate::opcode::{FixedSlot, Format, Opcode, SlotRule};
use crate::print::instr_to_string;
use crate::reg::{RegBank, EXEC, M0, SCC, VCC};

struct Checker<'a> {
    program: &'a Program,
    sink: &'a mut dyn DiagnosticSink,
    valid: bool,
}

impl Checker<'_> {
    /// Reports a finding when `ok` is false; returns `ok` so call sites can
    /// chain follow-up checks on it.
    fn check(
        &mut self,
        ok: bool,
        kind: FindingKind,
        block: u32,
        instr: Option<&Instruction>,
        message: String,
    ) -> bool {
        if !ok {
            self.valid = false;
            self.sink.report(Finding {
                kind,
                block,
                message,
                instr: instr.map(instr_to_string),
            });
        }
        ok
    }
}

/// Position of one definition, for intra-block ordering.
#[derive(Copy, Clone)]
struct DefSite {
    block: u32,
    index: usize,
}

fn slot_matches(
    c: &mut Checker<'_>,
    block: u32,
    instr: &Instruction,
    rule: &SlotRule,
    rc: Option<crate::reg::RegClass>,
    fixed: Option<crate::reg::PhysReg>,
    what: &str,
    slot: usize,
) {
    let program = c.program;
    match rule.fixed {
        FixedSlot::Scc => {
            c.check(
                fixed.is_none() || fixed == Some(SCC),
                FindingKind::Format,
                block,
                Some(instr),
                format!("{what} {slot} must be fixed to scc"),
            );
            if let Some(rc) = rc {
                c.check(
                    rc == crate::reg::RegClass::S1,
                    FindingKind::Type,
                    block,
                    Some(instr),
                    format!("{what} {slot} in scc must have class s1, has {rc}"),
                );
            }
        }
        FixedSlot::Exec => {
            c.check(
                fixed.is_none() || fixed == Some(EXEC),
                FindingKind::Format,
                block,
                Some(instr),
                format!("{what} {slot} must be fixed to exec"),
            );
            if let Some(rc) = rc {
                c.check(
                    rc == program.lane_mask(),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    format!("{what} {slot} in exec must be a lane mask, has {rc}"),
                );
            }
        }
        FixedSlot::Any if rule.bits == 1 => {
            if let Some(rc) = rc {
                c.check(
                    rc == program.lane_mask(),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    format!("{what} {slot} must be a lane mask, has {rc}"),
                );
            }
            // Wave booleans live in vcc unless the encoding can address
            // arbitrary sgprs.
            let relaxed = instr.format == Format::Vop3 || !instr.is_valu();
            if let Some(reg) = fixed {
                c.check(
                    relaxed || instr.is_sdwa() || reg == VCC,
                    FindingKind::Format,
                    block,
                    Some(instr),
                    format!("{what} {slot} carries a wave boolean and must use vcc"),
                );
            }
        }
        FixedSlot::Any => {
            if let Some(rc) = rc {
                // Width only; lane masks are acceptable wherever their byte
                // size fits (scalar ops move wave booleans around).
                c.check(
                    rc.bytes() * 8 == rule.bits,
                    FindingKind::Type,
                    block,
                    Some(instr),
                    format!(
                        "{what} {slot} must be {} bits wide, has {rc}",
                        rule.bits
                    ),
                );
            }
        }
    }
}

fn check_template(c: &mut Checker<'_>, block: u32, instr: &Instruction) {
    let info = instr.opcode.info();
    if !info.defs.is_empty() || !info.ops.is_empty() {
        let arity_ok = c.check(
            instr.definitions.len() == info.defs.len()
                && instr.operands.len() == info.ops.len(),
            FindingKind::Format,
            block,
            Some(instr),
            format!(
                "{} expects {} definitions and {} operands",
                instr.opcode.name(),
                info.defs.len(),
                info.ops.len()
            ),
        );
        if !arity_ok {
            return;
        }
        for (slot, (rule, def)) in info.defs.iter().zip(&instr.definitions).enumerate() {
            slot_matches(
                c,
                block,
                instr,
                rule,
                Some(def.reg_class()),
                def.phys_reg(),
                "definition",
                slot,
            );
        }
        for (slot, (rule, op)) in info.ops.iter().zip(&instr.operands).enumerate() {
            slot_matches(
                c,
                block,
                instr,
                rule,
                op.reg_class(),
                op.phys_reg(),
                "operand",
                slot,
            );
        }
    }
    c.check(
        instr.format == info.format,
        FindingKind::Format,
        block,
        Some(instr),
        format!("{} carries the wrong format class", instr.opcode.name()),
    );
}

fn check_sdwa(c: &mut Checker<'_>, block: u32, instr: &Instruction) {
    let gfx = c.program.gfx_level;
    if !c.check(
        sdwa_supported(gfx),
        FindingKind::Format,
        block,
        Some(instr),
        String::from("sdwa is not available on this generation"),
    ) {
        return;
    }
    c.check(
        instr.is_valu(),
        FindingKind::Format,
        block,
        Some(instr),
        String::from("sdwa applied to a non vector-alu instruction"),
    );
    let InstrExtra::Sdwa { dst_sel, sel } = instr.extra else {
        return;
    };
    for s in [dst_sel, sel[0], sel[1]] {
        c.check(
            matches!(s.size, 1 | 2 | 4) && s.offset % s.size == 0 && s.offset + s.size <= 4,
            FindingKind::Format,
            block,
            Some(instr),
            format!("invalid sdwa selection of {} bytes at offset {}", s.size, s.offset),
        );
    }
    if let Some(def) = instr.definitions.first() {
        if def.reg_class().is_subdword() {
            c.check(
                dst_sel.size == def.bytes(),
                FindingKind::Format,
                block,
                Some(instr),
                format!(
                    "sdwa destination selection of {} bytes does not cover the {} byte definition",
                    dst_sel.size,
                    def.bytes()
                ),
            );
        }
    }
    // Beyond the two selectable sources, everything must sit in vcc.
    for (i, op) in instr.operands.iter().enumerate().skip(2) {
        if let Some(reg) = op.phys_reg() {
            c.check(
                reg == VCC,
                FindingKind::Format,
                block,
                Some(instr),
                format!("sdwa operand {i} must be fixed to vcc"),
            );
        }
    }
    for def in instr.definitions.iter().skip(1) {
        if let Some(reg) = def.phys_reg() {
            c.check(
                reg == VCC,
                FindingKind::Format,
                block,
                Some(instr),
                String::from("the second sdwa definition must be fixed to vcc"),
            );
        }
    }
}

fn check_valu(c: &mut Checker<'_>, block: u32, instr: &Instruction) {
    let program = c.program;
    let gfx = program.gfx_level;

    if instr.is_sdwa() {
        check_sdwa(c, block, instr);
    }

    // Definition banks.
    let sgpr_result = instr.format == Format::Vopc
        || matches!(
            instr.opcode,
            Opcode::VReadfirstlaneB32 | Opcode::VReadlaneB32
        );
    if let Some(def) = instr.definitions.first() {
        let bank = def.reg_class().bank();
        if sgpr_result {
            c.check(
                bank == RegBank::Sgpr,
                FindingKind::Type,
                block,
                Some(instr),
                String::from("this instruction writes a scalar result"),
            );
        } else {
            c.check(
                bank.is_vgpr(),
                FindingKind::Type,
                block,
                Some(instr),
                String::from("vector-alu results must be vgprs"),
            );
        }
    }

    // Literals.
    let mut literal: Option<u64> = None;
    let mut literal_count = 0_usize;
    for (i, op) in instr.operands.iter().enumerate() {
        if !op.is_literal() {
            continue;
        }
        let value = op.constant_value();
        if literal != Some(value) {
            literal = Some(value);
            literal_count += 1;
        }
        c.check(
            !instr.is_sdwa(),
            FindingKind::Format,
            block,
            Some(instr),
            String::from("literals cannot be used with sdwa"),
        );
        c.check(
            instr.format != Format::Vop3 || vop3_literal_supported(gfx),
            FindingKind::Format,
            block,
            Some(instr),
            String::from("vop3 literals need gfx10 or later"),
        );
        c.check(
            instr.format == Format::Vop3 || i == 0 || i == 2,
            FindingKind::Format,
            block,
            Some(instr),
            format!("a literal cannot appear in operand slot {i}"),
        );
    }
    c.check(
        literal_count <= 1,
        FindingKind::Format,
        block,
        Some(instr),
        String::from("only one distinct literal is allowed"),
    );

    // Constant bus: distinct scalars plus a literal share a small budget.
    let scalar_mask = valu_scalar_mask(gfx, instr);
    let mut scalar_ids: [u32; 4] = [0; 4];
    let mut scalar_count = 0_usize;
    for (i, op) in instr.operands.iter().enumerate() {
        let is_scalar = op
            .reg_class()
            .is_some_and(|rc| rc.bank() == RegBank::Sgpr);
        if !is_scalar && !op.is_literal() {
            continue;
        }
        c.check(
            i >= 3 || scalar_mask & (1 << i) != 0,
            FindingKind::Format,
            block,
            Some(instr),
            format!("operand slot {i} of this encoding cannot read a scalar"),
        );
        if is_scalar {
            let id = op.temp_id();
            if !scalar_ids[..scalar_count].contains(&id) && scalar_count < 4 {
                scalar_ids[scalar_count] = id;
                scalar_count += 1;
            }
        }
    }
    let bus_uses = scalar_count + usize::from(literal.is_some());
    c.check(
        bus_uses <= const_bus_limit(gfx, instr),
        FindingKind::Format,
        block,
        Some(instr),
        format!(
            "{bus_uses} constant bus uses exceed the limit of {}",
            const_bus_limit(gfx, instr)
        ),
    );

    // Lane access instructions mix banks deliberately.
    match instr.opcode {
        Opcode::VReadlaneB32 | Opcode::VReadfirstlaneB32 => {
            c.check(
                instr.operands.first().is_none_or(|o| o.is_of_bank(true)),
                FindingKind::Type,
                block,
                Some(instr),
                String::from("the lane source of a readlane must be a vgpr"),
            );
            c.check(
                instr.operands.get(1).is_none_or(|o| !o.is_of_bank(true)),
                FindingKind::Type,
                block,
                Some(instr),
                String::from("the lane index of a readlane must be scalar"),
            );
        }
        Opcode::VWritelaneB32 => {
            c.check(
                instr
                    .operands
                    .iter()
                    .take(2)
                    .all(|o| !o.is_of_bank(true)),
                FindingKind::Type,
                block,
                Some(instr),
                String::from("v_writelane sources must be scalar"),
            );
            c.check(
                instr.operands.get(2).is_none_or(|o| o.is_of_bank(true)),
                FindingKind::Type,
                block,
                Some(instr),
                String::from("the tied vector of v_writelane must be a vgpr"),
            );
        }
        _ => {}
    }
}

fn check_salu(c: &mut Checker<'_>, block: u32, instr: &Instruction) {
    for (i, op) in instr.operands.iter().enumerate() {
        c.check(
            !op.is_of_bank(true),
            FindingKind::Type,
            block,
            Some(instr),
            format!("scalar-alu operand {i} cannot be a vgpr"),
        );
    }
    for def in &instr.definitions {
        c.check(
            def.reg_class().bank() == RegBank::Sgpr,
            FindingKind::Type,
            block,
            Some(instr),
            String::from("scalar-alu results must be sgprs"),
        );
    }
}

fn check_pseudo(c: &mut Checker<'_>, bb: &Block, instr: &Instruction) {
    let block = bb.index;
    match instr.opcode {
        Opcode::PCreateVector => {
            let Some(def) = instr.definitions.first() else {
                return;
            };
            let total: u32 = instr.operands.iter().map(|o| o.bytes()).sum();
            c.check(
                total == def.bytes(),
                FindingKind::Type,
                block,
                Some(instr),
                format!(
                    "operands of {} bytes cannot build a {} byte vector",
                    total,
                    def.bytes()
                ),
            );
            if def.reg_class().bank() == RegBank::Sgpr {
                for (i, op) in instr.operands.iter().enumerate() {
                    c.check(
                        !op.is_of_bank(true),
                        FindingKind::Type,
                        block,
                        Some(instr),
                        format!("operand {i} of a scalar vector build cannot be a vgpr"),
                    );
                }
            }
        }
        Opcode::PExtractVector => {
            let (Some(def), Some(vec_op), Some(idx_op)) = (
                instr.definitions.first(),
                instr.operands.first(),
                instr.operands.get(1),
            ) else {
                return;
            };
            if !c.check(
                idx_op.is_constant(),
                FindingKind::Type,
                block,
                Some(instr),
                String::from("the extraction index must be a constant"),
            ) {
                return;
            }
            let index = idx_op.constant_value() as u32;
            c.check(
                (index + 1) * def.bytes() <= vec_op.bytes(),
                FindingKind::Type,
                block,
                Some(instr),
                format!(
                    "element {} of {} bytes lies outside the {} byte vector",
                    index,
                    def.bytes(),
                    vec_op.bytes()
                ),
            );
        }
        Opcode::PSplitVector => {
            let Some(op) = instr.operands.first() else {
                return;
            };
            let total: u32 = instr.definitions.iter().map(|d| d.bytes()).sum();
            c.check(
                total == op.bytes(),
                FindingKind::Type,
                block,
                Some(instr),
                format!(
                    "split parts of {} bytes do not cover the {} byte vector",
                    total,
                    op.bytes()
                ),
            );
            if op.is_of_bank(false) {
                for def in &instr.definitions {
                    c.check(
                        def.reg_class().bank() == RegBank::Sgpr,
                        FindingKind::Type,
                        block,
                        Some(instr),
                        String::from("parts of a scalar vector must be sgprs"),
                    );
                }
            }
        }
        Opcode::PParallelcopy => {
            if !c.check(
                instr.operands.len() == instr.definitions.len(),
                FindingKind::Type,
                block,
                Some(instr),
                String::from("a parallel copy needs one operand per definition"),
            ) {
                return;
            }
            for (i, (op, def)) in instr.operands.iter().zip(&instr.definitions).enumerate() {
                c.check(
                    op.bytes() == def.bytes(),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    format!("copy {i} changes size"),
                );
                if let Some(rc) = op.reg_class() {
                    c.check(
                        rc.bank().is_vgpr() == def.reg_class().bank().is_vgpr(),
                        FindingKind::Type,
                        block,
                        Some(instr),
                        format!("copy {i} changes register bank"),
                    );
                    c.check(
                        rc.is_linear() == def.reg_class().is_linear(),
                        FindingKind::Type,
                        block,
                        Some(instr),
                        format!("copy {i} mixes linear and logical classes"),
                    );
                }
            }
        }
        Opcode::PPhi => {
            c.check(
                instr.operands.len() == bb.logical_preds.len(),
                FindingKind::Structural,
                block,
                Some(instr),
                format!(
                    "phi has {} operands for {} logical predecessors",
                    instr.operands.len(),
                    bb.logical_preds.len()
                ),
            );
            if let Some(def) = instr.definitions.first() {
                c.check(
                    def.reg_class().bank().is_vgpr() && !def.reg_class().is_linear(),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    String::from("logical phis carry per-lane values and must define vgprs"),
                );
            }
        }
        Opcode::PLinearPhi => {
            c.check(
                instr.operands.len() == bb.linear_preds.len(),
                FindingKind::Structural,
                block,
                Some(instr),
                format!(
                    "linear phi has {} operands for {} linear predecessors",
                    instr.operands.len(),
                    bb.linear_preds.len()
                ),
            );
            if let Some(def) = instr.definitions.first() {
                c.check(
                    def.reg_class().is_linear(),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    String::from("linear phis must define linear classes"),
                );
            }
        }
        Opcode::PAsUniform => {
            let (Some(def), Some(op)) = (instr.definitions.first(), instr.operands.first())
            else {
                return;
            };
            c.check(
                op.is_of_bank(true) && def.reg_class().bank() == RegBank::Sgpr,
                FindingKind::Type,
                block,
                Some(instr),
                String::from("uniformization reads a vgpr and writes an sgpr"),
            );
            c.check(
                op.bytes() == def.bytes(),
                FindingKind::Type,
                block,
                Some(instr),
                String::from("uniformization cannot change the value size"),
            );
        }
        Opcode::PStartLinearVgpr => {
            if let Some(def) = instr.definitions.first() {
                c.check(
                    def.reg_class().is_linear_vgpr(),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    String::from("this instruction begins a linear vgpr lifetime"),
                );
            }
            c.check(
                instr.operands.len() <= 1,
                FindingKind::Format,
                block,
                Some(instr),
                String::from("at most one initializer operand is allowed"),
            );
        }
        _ => {}
    }
}

fn check_reduction(c: &mut Checker<'_>, block: u32, instr: &Instruction) {
    for (i, op) in instr.operands.iter().enumerate() {
        if op.is_temp() {
            c.check(
                op.is_of_bank(true),
                FindingKind::Type,
                block,
                Some(instr),
                format!("reduction operand {i} must be a vgpr"),
            );
        }
    }
    let cluster_size = match instr.extra {
        InstrExtra::Reduction { cluster_size } => cluster_size,
        _ => c.program.wave_size,
    };
    if let Some(def) = instr.definitions.first() {
        if cluster_size == c.program.wave_size {
            c.check(
                def.reg_class().bank() == RegBank::Sgpr,
                FindingKind::Type,
                block,
                Some(instr),
                String::from("an unclustered reduction produces a uniform scalar"),
            );
        } else {
            c.check(
                def.reg_class().bank().is_vgpr(),
                FindingKind::Type,
                block,
                Some(instr),
                String::from("a clustered reduction produces per-lane results"),
            );
        }
    }
}

fn check_memory(c: &mut Checker<'_>, block: u32, instr: &Instruction) {
    let scalar_slots: &[usize] = match instr.format {
        // resource, then soffset
        Format::Mubuf => &[0, 2],
        // resource and sampler
        Format::Mimg => &[0, 1],
        _ => &[],
    };
    match instr.format {
        Format::Smem => {
            for (i, op) in instr.operands.iter().enumerate() {
                c.check(
                    !op.is_of_bank(true),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    format!("scalar memory operand {i} cannot be a vgpr"),
                );
            }
            for def in &instr.definitions {
                c.check(
                    def.reg_class().bank() == RegBank::Sgpr,
                    FindingKind::Type,
                    block,
                    Some(instr),
                    String::from("scalar memory loads write sgprs"),
                );
            }
        }
        Format::Ds | Format::Exp => {
            for (i, op) in instr.operands.iter().enumerate() {
                if op.phys_reg() == Some(M0) {
                    continue;
                }
                if op.is_temp() {
                    c.check(
                        op.is_of_bank(true),
                        FindingKind::Type,
                        block,
                        Some(instr),
                        format!("shared/export operand {i} must be a vgpr"),
                    );
                }
            }
            for def in &instr.definitions {
                c.check(
                    def.reg_class().bank().is_vgpr(),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    String::from("shared memory loads write vgprs"),
                );
            }
        }
        Format::Mubuf | Format::Mimg => {
            for (i, op) in instr.operands.iter().enumerate() {
                if !op.is_temp() {
                    continue;
                }
                if scalar_slots.contains(&i) {
                    c.check(
                        !op.is_of_bank(true),
                        FindingKind::Type,
                        block,
                        Some(instr),
                        format!("descriptor operand {i} must be scalar"),
                    );
                } else {
                    c.check(
                        op.is_of_bank(true),
                        FindingKind::Type,
                        block,
                        Some(instr),
                        format!("address/data operand {i} must be a vgpr"),
                    );
                }
            }
            for def in &instr.definitions {
                c.check(
                    def.reg_class().bank().is_vgpr(),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    String::from("vector memory loads write vgprs"),
                );
            }
        }
        Format::Flat | Format::Global => {
            if let Some(op) = instr.operands.first() {
                c.check(
                    op.is_of_bank(true),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    String::from("the address of a flat access lives in vgprs"),
                );
            }
            // A scalar base address may ride along in slot 1; data follows.
            for (i, op) in instr.operands.iter().enumerate().skip(2) {
                if op.is_temp() {
                    c.check(
                        op.is_of_bank(true),
                        FindingKind::Type,
                        block,
                        Some(instr),
                        format!("data operand {i} must be a vgpr"),
                    );
                }
            }
            for def in &instr.definitions {
                c.check(
                    def.reg_class().bank().is_vgpr(),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    String::from("flat memory loads write vgprs"),
                );
            }
        }
        _ => {}
    }
}

fn check_instruction(c: &mut Checker<'_>, bb: &Block, instr: &Instruction) {
    let block = bb.index;
    let program = c.program;

    check_template(c, block, instr);

    // Register class consistency against the program-wide table. Lowering
    // to hardware form recycles temporaries, so the table stops being
    // authoritative from that point on.
    if program.progress < CompilationProgress::AfterLowerToHw {
        for op in &instr.operands {
            if let Some(temp) = op.as_temp() {
                c.check(
                    program.temp_rc(temp.id()) == Some(temp.reg_class()),
                    FindingKind::Type,
                    block,
                    Some(instr),
                    format!("%{} used with a class other than its declared one", temp.id()),
                );
            }
        }
        for def in &instr.definitions {
            let temp = def.temp();
            c.check(
                program.temp_rc(temp.id()) == Some(temp.reg_class()),
                FindingKind::Type,
                block,
                Some(instr),
                format!("%{} defined with a class other than its declared one", temp.id()),
            );
        }
    }

    // Undefined operands only make sense where a value is assembled,
    // merged or exported with a partial mask, never as a real data source.
    for (i, op) in instr.operands.iter().enumerate() {
        c.check(
            !op.is_undefined() || instr.is_pseudo() || instr.format == Format::Exp,
            FindingKind::Format,
            block,
            Some(instr),
            format!("operand {i} is undefined"),
        );
    }

    // Linear vgprs stay allocated across divergence and may only die where
    // control flow is flat.
    for (i, op) in instr.operands.iter().enumerate() {
        let linear_vgpr = op
            .reg_class()
            .is_some_and(crate::reg::RegClass::is_linear_vgpr);
        c.check(
            !(linear_vgpr && op.is_kill()) || bb.kind.contains(BlockKind::TOP_LEVEL),
            FindingKind::Structural,
            block,
            Some(instr),
            format!("linear vgpr operand {i} killed outside a top-level block"),
        );
    }

    // Oversized sub-dword definitions.
    for def in &instr.definitions {
        let rc = def.reg_class();
        c.check(
            !(rc.is_subdword() && rc.bytes() > 4) || can_write_oversized_subdword(instr.format),
            FindingKind::Format,
            block,
            Some(instr),
            format!(
                "a {} byte sub-dword definition is not expressible in this format",
                rc.bytes()
            ),
        );
    }

    if instr.is_valu() {
        check_valu(c, block, instr);
    } else if instr.is_salu() {
        check_salu(c, block, instr);
        c.check(
            !instr.is_sdwa(),
            FindingKind::Format,
            block,
            Some(instr),
            String::from("sdwa applied to a non vector-alu instruction"),
        );
    } else if instr.format == Format::Pseudo {
        check_pseudo(c, bb, instr);
    } else if instr.format == Format::PseudoReduction {
        check_reduction(c, block, instr);
    } else {
        check_memory(c, block, instr);
    }
}

fn check_symmetry(c: &mut Checker<'_>, program: &Program) {
    for block in &program.blocks {
        for kind in [EdgeKind::Logical, EdgeKind::Linear] {
            for &succ in block.succs(kind) {
                let back = program
                    .blocks
                    .get(succ as usize)
                    .is_some_and(|s| s.preds(kind).contains(&block.index));
                c.check(
                    back,
                    FindingKind::Structural,
                    block.index,
                    None,
                    format!(
                        "edge BB{} -> BB{} has no matching predecessor entry",
                        block.index, succ
                    ),
                );
            }
            for &pred in block.preds(kind) {
                let fwd = program
                    .blocks
                    .get(pred as usize)
                    .is_some_and(|p| p.succs(kind).contains(&block.index));
                c.check(
                    fwd,
                    FindingKind::Structural,
                    block.index,
                    None,
                    format!(
                        "predecessor entry BB{} of BB{} has no matching edge",
                        pred, block.index
                    ),
                );
            }
        }
    }
}

fn check_ssa(c: &mut Checker<'_>, program: &Program) {
    let mut def_sites: HashMap<u32, DefSite> = HashMap::new();
    for block in &program.blocks {
        for (index, instr) in block.instructions.iter().enumerate() {
            for def in &instr.definitions {
                let id = def.temp_id();
                if def_sites.contains_key(&id) {
                    c.check(
                        false,
                        FindingKind::Ssa,
                        block.index,
                        Some(instr),
                        format!("temporary %{id} defined twice"),
                    );
                } else {
                    def_sites.insert(
                        id,
                        DefSite {
                            block: block.index,
                            index,
                        },
                    );
                }
            }
        }
    }

    let logical_dom = DomTree::build(program, EdgeKind::Logical);
    let linear_dom = DomTree::build(program, EdgeKind::Linear);

    for block in &program.blocks {
        let mut past_phis = false;
        for (index, instr) in block.instructions.iter().enumerate() {
            if instr.is_phi() {
                c.check(
                    !past_phis,
                    FindingKind::Structural,
                    block.index,
                    Some(instr),
                    String::from("phis must precede all other instructions"),
                );
            } else {
                past_phis = true;
            }

            for (i, op) in instr.operands.iter().enumerate() {
                let Some(temp) = op.as_temp() else { continue };
                let Some(site) = def_sites.get(&temp.id()).copied() else {
                    c.check(
                        false,
                        FindingKind::Ssa,
                        block.index,
                        Some(instr),
                        format!("temporary %{} is never defined", temp.id()),
                    );
                    continue;
                };
                let dom = if temp.reg_class().is_linear() {
                    &linear_dom
                } else {
                    &logical_dom
                };
                if instr.is_phi() {
                    let kind = if instr.opcode == Opcode::PPhi {
                        EdgeKind::Logical
                    } else {
                        EdgeKind::Linear
                    };
                    let dom = if kind == EdgeKind::Linear {
                        &linear_dom
                    } else {
                        &logical_dom
                    };
                    let Some(&pred) = block.preds(kind).get(i) else {
                        continue;
                    };
                    c.check(
                        dom.dominates(site.block, pred),
                        FindingKind::Ssa,
                        block.index,
                        Some(instr),
                        format!(
                            "%{} does not dominate the predecessor BB{} that flows into this phi",
                            temp.id(),
                            pred
                        ),
                    );
                } else if site.block == block.index {
                    c.check(
                        site.index < index,
                        FindingKind::Ssa,
                        block.index,
                        Some(instr),
                        format!("%{} used before its definition", temp.id()),
                    );
                } else {
                    c.check(
                        dom.dominates(site.block, block.index),
                        FindingKind::Ssa,
                        block.index,
                        Some(instr),
                        format!(
                            "the definition of %{} in BB{} does not dominate this use",
                            temp.id(),
                            site.block
                        ),
                    );
                }
            }
        }
    }
}

/// Validates structure, single assignment and per-format encoding rules.
#[must_use]
pub fn validate_ir(program: &Program, sink: &mut dyn DiagnosticSink) -> bool {
    let mut c = Checker {
        program,
        sink,
        valid: true,
    };

    check_symmetry(&mut c, program);

    for block in &program.blocks {
        for instr in &block.instructions {
            check_instruction(&mut c, block, instr);
        }
    }

    // Single assignment only holds up to the lowering out of SSA form.
    if program.progress < CompilationProgress::AfterLowerToHw {
        check_ssa(&mut c, program);
    }

    c.valid
}
