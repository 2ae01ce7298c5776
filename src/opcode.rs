// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opcodes, hardware format classes and per-opcode slot templates.
//!
//! The slot templates are the machine-readable contract the structural
//! validator checks instructions against: how many operands/definitions an
//! opcode has, which slots are pinned to special registers and which must be
//! wave-boolean lane masks. Memory and pseudo opcodes carry empty templates;
//! their constraints are positional and live in the per-format rules of the
//! validator instead.

/// Hardware format class of an instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Compiler-internal pseudo instruction.
    Pseudo,
    /// Compiler-internal branch.
    PseudoBranch,
    /// Compiler-internal cross-lane reduction.
    PseudoReduction,
    /// Scalar ALU, one source.
    Sop1,
    /// Scalar ALU, two sources.
    Sop2,
    /// Scalar program control.
    Sopp,
    /// Scalar memory.
    Smem,
    /// Vector ALU, one source.
    Vop1,
    /// Vector ALU, two sources.
    Vop2,
    /// Vector ALU, three sources / extended encoding.
    Vop3,
    /// Vector compare.
    Vopc,
    /// Local data share.
    Ds,
    /// Buffer memory.
    Mubuf,
    /// Image memory.
    Mimg,
    /// Export.
    Exp,
    /// Flat memory.
    Flat,
    /// Global memory.
    Global,
}

/// Special-register pinning for a template slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FixedSlot {
    /// Any register of the right class.
    Any,
    /// Must be fixed to `scc`.
    Scc,
    /// Must be fixed to `exec`.
    Exec,
}

/// One operand/definition slot of an opcode template.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotRule {
    /// Special-register pinning.
    pub fixed: FixedSlot,
    /// Value width in bits; 1 means a wave-boolean lane mask.
    pub bits: u32,
}

/// A free slot holding a 16-bit value.
const A16: SlotRule = SlotRule {
    fixed: FixedSlot::Any,
    bits: 16,
};
/// A free slot holding a 32-bit value.
const A32: SlotRule = SlotRule {
    fixed: FixedSlot::Any,
    bits: 32,
};
/// A free slot holding a 64-bit value.
const A64: SlotRule = SlotRule {
    fixed: FixedSlot::Any,
    bits: 64,
};
/// A free slot holding a wave-boolean lane mask.
const BOOL: SlotRule = SlotRule {
    fixed: FixedSlot::Any,
    bits: 1,
};
/// A slot pinned to the scalar condition code.
const D_SCC: SlotRule = SlotRule {
    fixed: FixedSlot::Scc,
    bits: 1,
};
/// A slot pinned to the execution mask.
const D_EXEC: SlotRule = SlotRule {
    fixed: FixedSlot::Exec,
    bits: 1,
};

/// Per-opcode template consumed by the validators.
#[derive(Copy, Clone, Debug)]
pub struct OpcodeInfo {
    /// Canonical format class.
    pub format: Format,
    /// Assembly-style mnemonic.
    pub name: &'static str,
    /// Definition slots. Empty means the arity is not template-checked.
    pub defs: &'static [SlotRule],
    /// Operand slots. Empty means the arity is not template-checked.
    pub ops: &'static [SlotRule],
    /// Operand indices tied to definitions, in definition order: the n-th
    /// entry names the operand whose register definition n must reuse.
    pub tied: &'static [u32],
}

/// All modeled opcodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Logical phi, operands selected by logical predecessor index.
    PPhi,
    /// Linear phi, operands selected by linear predecessor index.
    PLinearPhi,
    /// Parallel copy group.
    PParallelcopy,
    /// Build a vector from contiguous parts.
    PCreateVector,
    /// Extract one element of a vector.
    PExtractVector,
    /// Split a vector into parts.
    PSplitVector,
    /// Copy a vector value into scalar registers lane-uniformly.
    PAsUniform,
    /// Begin a linear VGPR lifetime.
    PStartLinearVgpr,
    /// Marks the end of a block's logical contents.
    PLogicalEnd,
    /// Unconditional pseudo branch.
    PBranch,
    /// Branch if scc is zero.
    PCbranchZ,
    /// Branch if scc is non-zero.
    PCbranchNz,
    /// Cross-lane reduction.
    PReduce,

    /// Scalar move.
    SMovB32,
    /// Scalar 64-bit move.
    SMovB64,
    /// Scalar bitwise not (also writes scc).
    SNotB32,
    /// AND with exec, saving the old mask.
    SAndSaveexecB64,
    /// Scalar add.
    SAddU32,
    /// Scalar add with carry-in.
    SAddcU32,
    /// Scalar bitwise and.
    SAndB32,
    /// Scalar 64-bit bitwise and.
    SAndB64,
    /// Scalar conditional select on scc.
    SCselectB32,
    /// End of program.
    SEndpgm,
    /// Wait for outstanding memory operations.
    SWaitcnt,
    /// Scalar memory load, 1 dword.
    SLoadDword,
    /// Scalar memory load, 4 dwords.
    SLoadDwordx4,

    /// Vector move.
    VMovB32,
    /// Convert byte 1 of the source to float.
    VCvtF32Ubyte1,
    /// Read a value from the first active lane into a scalar.
    VReadfirstlaneB32,
    /// Vector float add.
    VAddF32,
    /// Vector float multiply.
    VMulF32,
    /// Vector 16-bit float add.
    VAddF16,
    /// Vector multiply-accumulate; the accumulator operand is tied.
    VMacF32,
    /// Vector add with carry-out lane mask.
    VAddCoU32,
    /// Per-lane select on a lane mask.
    VCndmaskB32,
    /// Vector float compare, equal.
    VCmpEqF32,
    /// Vector unsigned compare, less-than.
    VCmpLtU32,
    /// Fused multiply-add (extended encoding).
    VMadF32,
    /// 64-bit shift (reversed operands).
    VLshlrevB64,
    /// Read one lane into a scalar.
    VReadlaneB32,
    /// Write a scalar into one lane; the vector operand is tied.
    VWritelaneB32,

    /// LDS read, 1 dword.
    DsReadB32,
    /// LDS write, 1 dword.
    DsWriteB32,
    /// LDS 16-bit read into the high half-dword.
    DsReadU16D16Hi,
    /// LDS 16-bit write from the high half-dword.
    DsWriteB16D16Hi,

    /// Buffer load, 1 dword.
    BufferLoadDword,
    /// Buffer 16-bit load into the low half-dword.
    BufferLoadShortD16,
    /// Buffer 16-bit load into the high half-dword.
    BufferLoadShortD16Hi,
    /// Buffer store, 1 dword.
    BufferStoreDword,

    /// Image sample.
    ImageSample,

    /// Export.
    Exp,

    /// Flat load, 1 dword.
    FlatLoadDword,
    /// Flat store, 1 dword.
    FlatStoreDword,
    /// Global load, 1 dword.
    GlobalLoadDword,
    /// Global store, 1 dword.
    GlobalStoreDword,
}

macro_rules! info {
    ($format:ident, $name:literal) => {
        OpcodeInfo {
            format: Format::$format,
            name: $name,
            defs: &[],
            ops: &[],
            tied: &[],
        }
    };
    ($format:ident, $name:literal, defs: $defs:expr, ops: $ops:expr) => {
        OpcodeInfo {
            format: Format::$format,
            name: $name,
            defs: $defs,
            ops: $ops,
            tied: &[],
        }
    };
    ($format:ident, $name:literal, defs: $defs:expr, ops: $ops:expr, tied: $tied:expr) => {
        OpcodeInfo {
            format: Format::$format,
            name: $name,
            defs: $defs,
            ops: $ops,
            tied: $tied,
        }
    };
}

impl Opcode {
    /// The template for this opcode.
    #[must_use]
    pub const fn info(self) -> OpcodeInfo {
        match self {
            Self::PPhi => info!(Pseudo, "p_phi"),
            Self::PLinearPhi => info!(Pseudo, "p_linear_phi"),
            Self::PParallelcopy => info!(Pseudo, "p_parallelcopy"),
            Self::PCreateVector => info!(Pseudo, "p_create_vector"),
            Self::PExtractVector => info!(Pseudo, "p_extract_vector"),
            Self::PSplitVector => info!(Pseudo, "p_split_vector"),
            Self::PAsUniform => info!(Pseudo, "p_as_uniform"),
            Self::PStartLinearVgpr => info!(Pseudo, "p_start_linear_vgpr"),
            Self::PLogicalEnd => info!(Pseudo, "p_logical_end"),
            Self::PBranch => info!(PseudoBranch, "p_branch"),
            Self::PCbranchZ => info!(PseudoBranch, "p_cbranch_z"),
            Self::PCbranchNz => info!(PseudoBranch, "p_cbranch_nz"),
            Self::PReduce => info!(PseudoReduction, "p_reduce"),

            Self::SMovB32 => info!(Sop1, "s_mov_b32", defs: &[A32], ops: &[A32]),
            Self::SMovB64 => info!(Sop1, "s_mov_b64", defs: &[A64], ops: &[A64]),
            Self::SNotB32 => {
                info!(Sop1, "s_not_b32", defs: &[A32, D_SCC], ops: &[A32])
            }
            Self::SAndSaveexecB64 => {
                info!(Sop1, "s_and_saveexec_b64", defs: &[BOOL, D_SCC, D_EXEC], ops: &[BOOL, D_EXEC])
            }
            Self::SAddU32 => {
                info!(Sop2, "s_add_u32", defs: &[A32, D_SCC], ops: &[A32, A32])
            }
            Self::SAddcU32 => {
                info!(Sop2, "s_addc_u32", defs: &[A32, D_SCC], ops: &[A32, A32, D_SCC])
            }
            Self::SAndB32 => {
                info!(Sop2, "s_and_b32", defs: &[A32, D_SCC], ops: &[A32, A32])
            }
            Self::SAndB64 => {
                info!(Sop2, "s_and_b64", defs: &[A64, D_SCC], ops: &[A64, A64])
            }
            Self::SCselectB32 => {
                info!(Sop2, "s_cselect_b32", defs: &[A32], ops: &[A32, A32, D_SCC])
            }
            Self::SEndpgm => info!(Sopp, "s_endpgm"),
            Self::SWaitcnt => info!(Sopp, "s_waitcnt"),
            Self::SLoadDword => info!(Smem, "s_load_dword"),
            Self::SLoadDwordx4 => info!(Smem, "s_load_dwordx4"),

            Self::VMovB32 => info!(Vop1, "v_mov_b32", defs: &[A32], ops: &[A32]),
            Self::VCvtF32Ubyte1 => {
                info!(Vop1, "v_cvt_f32_ubyte1", defs: &[A32], ops: &[A32])
            }
            Self::VReadfirstlaneB32 => {
                info!(Vop1, "v_readfirstlane_b32", defs: &[A32], ops: &[A32])
            }
            Self::VAddF32 => {
                info!(Vop2, "v_add_f32", defs: &[A32], ops: &[A32, A32])
            }
            Self::VMulF32 => {
                info!(Vop2, "v_mul_f32", defs: &[A32], ops: &[A32, A32])
            }
            Self::VAddF16 => {
                info!(Vop2, "v_add_f16", defs: &[A16], ops: &[A16, A16])
            }
            Self::VMacF32 => {
                info!(Vop2, "v_mac_f32", defs: &[A32], ops: &[A32, A32, A32], tied: &[2])
            }
            Self::VAddCoU32 => {
                info!(Vop2, "v_add_co_u32", defs: &[A32, BOOL], ops: &[A32, A32])
            }
            Self::VCndmaskB32 => {
                info!(Vop2, "v_cndmask_b32", defs: &[A32], ops: &[A32, A32, BOOL])
            }
            Self::VCmpEqF32 => {
                info!(Vopc, "v_cmp_eq_f32", defs: &[BOOL], ops: &[A32, A32])
            }
            Self::VCmpLtU32 => {
                info!(Vopc, "v_cmp_lt_u32", defs: &[BOOL], ops: &[A32, A32])
            }
            Self::VMadF32 => {
                info!(Vop3, "v_mad_f32", defs: &[A32], ops: &[A32, A32, A32])
            }
            Self::VLshlrevB64 => {
                info!(Vop3, "v_lshlrev_b64", defs: &[A64], ops: &[A32, A64])
            }
            Self::VReadlaneB32 => {
                info!(Vop3, "v_readlane_b32", defs: &[A32], ops: &[A32, A32])
            }
            Self::VWritelaneB32 => {
                info!(Vop3, "v_writelane_b32", defs: &[A32], ops: &[A32, A32, A32], tied: &[2])
            }

            Self::DsReadB32 => info!(Ds, "ds_read_b32"),
            Self::DsWriteB32 => info!(Ds, "ds_write_b32"),
            Self::DsReadU16D16Hi => info!(Ds, "ds_read_u16_d16_hi"),
            Self::DsWriteB16D16Hi => info!(Ds, "ds_write_b16_d16_hi"),

            Self::BufferLoadDword => info!(Mubuf, "buffer_load_dword"),
            Self::BufferLoadShortD16 => info!(Mubuf, "buffer_load_short_d16"),
            Self::BufferLoadShortD16Hi => info!(Mubuf, "buffer_load_short_d16_hi"),
            Self::BufferStoreDword => info!(Mubuf, "buffer_store_dword"),

            Self::ImageSample => info!(Mimg, "image_sample"),

            Self::Exp => info!(Exp, "exp"),

            Self::FlatLoadDword => info!(Flat, "flat_load_dword"),
            Self::FlatStoreDword => info!(Flat, "flat_store_dword"),
            Self::GlobalLoadDword => info!(Global, "global_load_dword"),
            Self::GlobalStoreDword => info!(Global, "global_store_dword"),
        }
    }

    /// The assembly-style mnemonic.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.info().name
    }
}
