// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! IR value types: temporaries, operands, definitions, instructions, blocks
//! and the owning [`Program`].
//!
//! Ownership is strictly tree shaped: a `Program` owns its `Block`s, a `Block`
//! owns its `Instruction`s. Cross references (temp ids, block indices) are
//! plain integers so the validators can walk the program without aliasing.

use alloc::vec::Vec;

use crate::analysis::liveness::Liveness;
use crate::opcode::{Format, Opcode};
use crate::reg::{DeviceLimits, PhysReg, RegClass};

/// Target hardware generation. Ordering is chronological, so capability gates
/// read as `gfx_level >= GfxLevel::Gfx10`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum GfxLevel {
    /// GFX8 (first generation with SDWA and subdword pseudo writes).
    Gfx8,
    /// GFX9.
    Gfx9,
    /// GFX10.
    Gfx10,
    /// GFX10.3.
    Gfx10_3,
    /// GFX11 (SDWA removed).
    Gfx11,
    /// GFX12.
    Gfx12,
}

/// Pipeline stage marker. Some SSA and register-class invariants only hold
/// before the IR is lowered out of SSA form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CompilationProgress {
    /// After instruction selection.
    AfterIsel,
    /// After the optimizer.
    AfterOpt,
    /// After spilling.
    AfterSpilling,
    /// After register allocation.
    AfterRa,
    /// After lowering to hardware (non-SSA) form.
    AfterLowerToHw,
}

/// An SSA temporary: a unique id plus its register class.
///
/// Id `0` is reserved as the null temporary and never assigned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Temp {
    id: u32,
    rc: RegClass,
}

impl Temp {
    /// Creates a temp. The id must come from the program's type table.
    #[must_use]
    pub const fn new(id: u32, rc: RegClass) -> Self {
        Self { id, rc }
    }

    /// The unique id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.id
    }

    /// The register class.
    #[must_use]
    pub const fn reg_class(self) -> RegClass {
        self.rc
    }

    /// Size in bytes.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        self.rc.bytes()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum OperandKind {
    Temp(Temp),
    /// An inline or literal constant of a given byte width.
    Constant {
        value: u64,
        bytes: u32,
        literal: bool,
    },
    /// An intentionally undefined placeholder carrying only a class.
    Undefined(RegClass),
}

/// An instruction input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Operand {
    kind: OperandKind,
    fixed: Option<PhysReg>,
    kill: bool,
    first_kill: bool,
    late_kill: bool,
    vector_aligned: bool,
}

impl Operand {
    /// An operand reading `temp`.
    #[must_use]
    pub const fn temp(temp: Temp) -> Self {
        Self {
            kind: OperandKind::Temp(temp),
            fixed: None,
            kill: false,
            first_kill: false,
            late_kill: false,
            vector_aligned: false,
        }
    }

    /// An inline constant of `bytes` bytes.
    #[must_use]
    pub const fn constant(bytes: u32, value: u64) -> Self {
        Self {
            kind: OperandKind::Constant {
                value,
                bytes,
                literal: false,
            },
            fixed: None,
            kill: false,
            first_kill: false,
            late_kill: false,
            vector_aligned: false,
        }
    }

    /// A 32-bit literal constant (encoded in the instruction stream).
    #[must_use]
    pub const fn literal(value: u32) -> Self {
        Self {
            kind: OperandKind::Constant {
                value: value as u64,
                bytes: 4,
                literal: true,
            },
            fixed: None,
            kill: false,
            first_kill: false,
            late_kill: false,
            vector_aligned: false,
        }
    }

    /// An undefined placeholder of class `rc`.
    #[must_use]
    pub const fn undef(rc: RegClass) -> Self {
        Self {
            kind: OperandKind::Undefined(rc),
            fixed: None,
            kill: false,
            first_kill: false,
            late_kill: false,
            vector_aligned: false,
        }
    }

    /// Fixes the operand to a physical register.
    #[must_use]
    pub const fn fixed(mut self, reg: PhysReg) -> Self {
        self.fixed = Some(reg);
        self
    }

    /// Marks the last use of the temp (register released by this use).
    #[must_use]
    pub const fn kill(mut self) -> Self {
        self.kill = true;
        self.first_kill = true;
        self
    }

    /// Marks a kill that releases the register *after* the instruction
    /// executes rather than before.
    #[must_use]
    pub const fn late_kill(mut self) -> Self {
        self.kill = true;
        self.first_kill = true;
        self.late_kill = true;
        self
    }

    /// Marks the operand as part of a contiguous logical vector with the
    /// operand that follows it.
    #[must_use]
    pub const fn vector_aligned(mut self) -> Self {
        self.vector_aligned = true;
        self
    }

    /// Returns `true` if this operand references a temp.
    #[must_use]
    pub const fn is_temp(&self) -> bool {
        matches!(self.kind, OperandKind::Temp(_))
    }

    /// The referenced temp, if any.
    #[must_use]
    pub const fn as_temp(&self) -> Option<Temp> {
        match self.kind {
            OperandKind::Temp(t) => Some(t),
            _ => None,
        }
    }

    /// The referenced temp id, or 0 for non-temps.
    #[must_use]
    pub const fn temp_id(&self) -> u32 {
        match self.kind {
            OperandKind::Temp(t) => t.id(),
            _ => 0,
        }
    }

    /// Returns `true` for constants (inline or literal).
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self.kind, OperandKind::Constant { .. })
    }

    /// Returns `true` for literal constants.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            OperandKind::Constant { literal: true, .. }
        )
    }

    /// The constant value, or 0 for non-constants.
    #[must_use]
    pub const fn constant_value(&self) -> u64 {
        match self.kind {
            OperandKind::Constant { value, .. } => value,
            _ => 0,
        }
    }

    /// Returns `true` for undefined placeholders.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self.kind, OperandKind::Undefined(_))
    }

    /// The register class, if the operand has one (temps and undefs).
    #[must_use]
    pub const fn reg_class(&self) -> Option<RegClass> {
        match self.kind {
            OperandKind::Temp(t) => Some(t.reg_class()),
            OperandKind::Undefined(rc) => Some(rc),
            OperandKind::Constant { .. } => None,
        }
    }

    /// Returns `true` if the operand has a class in the given bank
    /// (linear VGPRs count as vector).
    #[must_use]
    pub fn is_of_bank(&self, vgpr: bool) -> bool {
        match self.reg_class() {
            Some(rc) => rc.bank().is_vgpr() == vgpr,
            None => false,
        }
    }

    /// Size in bytes.
    #[must_use]
    pub const fn bytes(&self) -> u32 {
        match self.kind {
            OperandKind::Temp(t) => t.bytes(),
            OperandKind::Constant { bytes, .. } => bytes,
            OperandKind::Undefined(rc) => rc.bytes(),
        }
    }

    /// Size in dwords, rounding subdword classes up.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.bytes().div_ceil(4)
    }

    /// Returns `true` if the operand is pinned to a physical register.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// The assigned physical register, if any.
    #[must_use]
    pub const fn phys_reg(&self) -> Option<PhysReg> {
        self.fixed
    }

    /// Returns `true` if this use releases the temp's register.
    #[must_use]
    pub const fn is_kill(&self) -> bool {
        self.kill
    }

    /// Returns `true` for the first killing use in the instruction.
    #[must_use]
    pub const fn is_first_kill(&self) -> bool {
        self.first_kill
    }

    /// Returns `true` if the kill releases the register only after the
    /// instruction executes.
    #[must_use]
    pub const fn is_late_kill(&self) -> bool {
        self.late_kill
    }

    /// Returns `true` if the register is released before execution.
    #[must_use]
    pub const fn is_first_kill_before_def(&self) -> bool {
        self.first_kill && !self.late_kill
    }

    /// Returns `true` if the operand must sit contiguously before its sibling.
    #[must_use]
    pub const fn is_vector_aligned(&self) -> bool {
        self.vector_aligned
    }
}

/// An instruction result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    temp: Temp,
    fixed: Option<PhysReg>,
    kill: bool,
}

impl Definition {
    /// A definition producing `temp`.
    #[must_use]
    pub const fn new(temp: Temp) -> Self {
        Self {
            temp,
            fixed: None,
            kill: false,
        }
    }

    /// Fixes the definition to a physical register.
    #[must_use]
    pub const fn fixed(mut self, reg: PhysReg) -> Self {
        self.fixed = Some(reg);
        self
    }

    /// Marks a dead write: the result register is released immediately.
    #[must_use]
    pub const fn kill(mut self) -> Self {
        self.kill = true;
        self
    }

    /// The produced temp.
    #[must_use]
    pub const fn temp(&self) -> Temp {
        self.temp
    }

    /// The produced temp id.
    #[must_use]
    pub const fn temp_id(&self) -> u32 {
        self.temp.id()
    }

    /// The register class of the produced temp.
    #[must_use]
    pub const fn reg_class(&self) -> RegClass {
        self.temp.reg_class()
    }

    /// Size in bytes.
    #[must_use]
    pub const fn bytes(&self) -> u32 {
        self.temp.bytes()
    }

    /// Size in dwords, rounding subdword classes up.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.temp.reg_class().size()
    }

    /// Returns `true` if the definition is pinned to a physical register.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// The assigned physical register, if any.
    #[must_use]
    pub const fn phys_reg(&self) -> Option<PhysReg> {
        self.fixed
    }

    /// Returns `true` for a dead write.
    #[must_use]
    pub const fn is_kill(&self) -> bool {
        self.kill
    }
}

/// Byte selection for SDWA operands/definitions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SubdwordSel {
    /// Selection size in bytes (1, 2 or 4).
    pub size: u32,
    /// Byte offset of the selection within the register.
    pub offset: u32,
}

impl SubdwordSel {
    /// The full-dword selection.
    pub const DWORD: Self = Self { size: 4, offset: 0 };

    /// A selection of `size` bytes at `offset`.
    #[must_use]
    pub const fn new(size: u32, offset: u32) -> Self {
        Self { size, offset }
    }
}

/// Format-specific instruction payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InstrExtra {
    /// No extra fields.
    None,
    /// Subdword addressing applied to a VALU instruction (GFX8-GFX10.3).
    Sdwa {
        /// Destination byte selection.
        dst_sel: SubdwordSel,
        /// Source byte selections for the first two operands.
        sel: [SubdwordSel; 2],
    },
    /// Cross-lane reduction parameters.
    Reduction {
        /// Number of lanes reduced together; the wave size means a full,
        /// unclustered reduction.
        cluster_size: u32,
    },
    /// Image instruction parameters.
    Mimg {
        /// 16-bit data path: loads preserve the unwritten half-dword.
        d16: bool,
    },
}

/// A single IR instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// The opcode.
    pub opcode: Opcode,
    /// The hardware format class. Derived from the opcode at construction,
    /// kept explicit so validators can cross-check it.
    pub format: Format,
    /// Inputs, in slot order.
    pub operands: Vec<Operand>,
    /// Results, in slot order.
    pub definitions: Vec<Definition>,
    /// Format-specific payload.
    pub extra: InstrExtra,
}

impl Instruction {
    /// Creates an instruction with the opcode's canonical format.
    #[must_use]
    pub fn new(opcode: Opcode, operands: Vec<Operand>, definitions: Vec<Definition>) -> Self {
        Self {
            opcode,
            format: opcode.info().format,
            operands,
            definitions,
            extra: InstrExtra::None,
        }
    }

    /// Attaches format-specific payload.
    #[must_use]
    pub fn with_extra(mut self, extra: InstrExtra) -> Self {
        self.extra = extra;
        self
    }

    /// Returns `true` for logical or linear phis.
    #[must_use]
    pub fn is_phi(&self) -> bool {
        matches!(self.opcode, Opcode::PPhi | Opcode::PLinearPhi)
    }

    /// Returns `true` for scalar ALU formats.
    #[must_use]
    pub fn is_salu(&self) -> bool {
        matches!(self.format, Format::Sop1 | Format::Sop2 | Format::Sopp)
    }

    /// Returns `true` for vector ALU formats.
    #[must_use]
    pub fn is_valu(&self) -> bool {
        matches!(
            self.format,
            Format::Vop1 | Format::Vop2 | Format::Vop3 | Format::Vopc
        )
    }

    /// Returns `true` for pseudo (compiler-internal) formats.
    #[must_use]
    pub fn is_pseudo(&self) -> bool {
        matches!(
            self.format,
            Format::Pseudo | Format::PseudoBranch | Format::PseudoReduction
        )
    }

    /// Returns `true` for vector-memory formats (buffer, image, flat).
    #[must_use]
    pub fn is_vmem(&self) -> bool {
        matches!(
            self.format,
            Format::Mubuf | Format::Mimg | Format::Flat | Format::Global
        )
    }

    /// Returns `true` if SDWA addressing is applied.
    #[must_use]
    pub fn is_sdwa(&self) -> bool {
        matches!(self.extra, InstrExtra::Sdwa { .. })
    }
}

/// Block kind tags, a small bitset in the style of a trace mask.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockKind(u32);

impl core::ops::BitOr for BlockKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for BlockKind {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BlockKind {
    /// No tags.
    pub const NONE: Self = Self(0);
    /// Outside any divergent control flow.
    pub const TOP_LEVEL: Self = Self(1 << 0);
    /// Join point of divergent control flow.
    pub const MERGE: Self = Self(1 << 1);
    /// Divergent branch head.
    pub const BRANCH: Self = Self(1 << 2);
    /// Exec-mask inversion block of an if/else.
    pub const INVERT: Self = Self(1 << 3);
    /// Wave-uniform control flow.
    pub const UNIFORM: Self = Self(1 << 4);

    /// Returns `true` if this kind includes all bits in `other`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

/// Which of the two CFGs an edge query refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    /// Vector-register (per-lane) control flow.
    Logical,
    /// Scalar/exec-mask control flow.
    Linear,
}

/// A basic block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// Position in the program's block sequence.
    pub index: u32,
    /// Owned instructions in execution order.
    pub instructions: Vec<Instruction>,
    /// Logical predecessors, sorted ascending.
    pub logical_preds: Vec<u32>,
    /// Logical successors, sorted ascending.
    pub logical_succs: Vec<u32>,
    /// Linear predecessors, sorted ascending.
    pub linear_preds: Vec<u32>,
    /// Linear successors, sorted ascending.
    pub linear_succs: Vec<u32>,
    /// Kind tags.
    pub kind: BlockKind,
}

impl Block {
    /// Predecessors for the given edge kind.
    #[must_use]
    pub fn preds(&self, kind: EdgeKind) -> &[u32] {
        match kind {
            EdgeKind::Logical => &self.logical_preds,
            EdgeKind::Linear => &self.linear_preds,
        }
    }

    /// Successors for the given edge kind.
    #[must_use]
    pub fn succs(&self, kind: EdgeKind) -> &[u32] {
        match kind {
            EdgeKind::Logical => &self.logical_succs,
            EdgeKind::Linear => &self.linear_succs,
        }
    }
}

/// A whole shader program in SSA-like form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    /// Blocks in program order; block 0 is the unique entry.
    pub blocks: Vec<Block>,
    /// Authoritative register class per temp id. Entry 0 is a placeholder for
    /// the reserved null temp.
    pub temp_rc: Vec<RegClass>,
    /// Target hardware generation.
    pub gfx_level: GfxLevel,
    /// Lanes per wave (32 or 64).
    pub wave_size: u32,
    /// Pipeline stage marker gating SSA/type invariants.
    pub progress: CompilationProgress,
    /// Register budgets for the allocation validator.
    pub limits: DeviceLimits,
    /// Whether the program declared a need for the vcc register.
    pub needs_vcc: bool,
    /// Cached liveness/demand state maintained incrementally by upstream
    /// passes; the liveness cross-check diffs it against a fresh computation.
    pub live: Option<Liveness>,
}

impl Program {
    /// The wave-boolean register class for this program's wave size.
    #[must_use]
    pub fn lane_mask(&self) -> RegClass {
        RegClass::lane_mask(self.wave_size)
    }

    /// The authoritative register class for a temp id, if in range.
    #[must_use]
    pub fn temp_rc(&self, id: u32) -> Option<RegClass> {
        self.temp_rc.get(id as usize).copied()
    }

    /// Total number of temp ids ever allocated (including the reserved 0).
    #[must_use]
    pub fn temp_count(&self) -> usize {
        self.temp_rc.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn operand_flags_compose() {
        let t = Temp::new(1, RegClass::V1);
        let op = Operand::temp(t).kill();
        assert!(op.is_kill() && op.is_first_kill() && !op.is_late_kill());
        assert!(op.is_first_kill_before_def());
        let op = Operand::temp(t).late_kill();
        assert!(op.is_kill() && op.is_late_kill());
        assert!(!op.is_first_kill_before_def());
    }

    #[test]
    fn operand_kinds() {
        assert!(Operand::literal(99).is_literal());
        assert!(Operand::constant(4, 7).is_constant());
        assert!(!Operand::constant(4, 7).is_literal());
        assert!(Operand::undef(RegClass::V2).is_undefined());
        assert_eq!(Operand::undef(RegClass::V2).bytes(), 8);
        assert_eq!(Operand::constant(8, 0).size(), 2);
    }

    #[test]
    fn instruction_format_follows_opcode() {
        let i = Instruction::new(Opcode::SMovB32, vec![], vec![]);
        assert_eq!(i.format, Format::Sop1);
        assert!(i.is_salu());
        let i = Instruction::new(Opcode::PPhi, vec![], vec![]);
        assert!(i.is_phi() && i.is_pseudo());
    }

    #[test]
    fn block_kind_bits() {
        let k = BlockKind::TOP_LEVEL | BlockKind::UNIFORM;
        assert!(k.contains(BlockKind::TOP_LEVEL));
        assert!(!k.contains(BlockKind::MERGE));
    }
}
