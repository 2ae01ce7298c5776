// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `shader_ir`: an SSA-style GPU shader compiler IR and its correctness layer.
//!
//! The crate models the mid/back-end intermediate representation of a wave-based
//! shader compiler: programs are ordered lists of basic blocks connected by *two*
//! control-flow graphs (a logical one for vector-register data flow and a linear
//! one for scalar/exec-mask control flow), and instructions carry per-format,
//! per-hardware-generation contracts.
//!
//! The validators are diagnostic oracles, not transformations: they prove or
//! disprove invariants and never repair a program.
//!
//! ## Example
//!
//! ```
//! extern crate alloc;
//!
//! use shader_ir::builder::ProgramBuilder;
//! use shader_ir::diag::{BufferSink, ValidateMask, ValidationConfig};
//! use shader_ir::ir::{BlockKind, GfxLevel};
//! use shader_ir::reg::RegClass;
//! use shader_ir::{Instruction, Opcode, Operand, Definition};
//!
//! let mut pb = ProgramBuilder::new(GfxLevel::Gfx10, 64);
//! let b0 = pb.create_block(BlockKind::TOP_LEVEL);
//! let t = pb.new_temp(RegClass::V1);
//! pb.push(
//!     b0,
//!     Instruction::new(
//!         Opcode::VMovB32,
//!         alloc::vec![Operand::constant(4, 0)],
//!         alloc::vec![Definition::new(t)],
//!     ),
//! );
//! let program = pb.build();
//!
//! let config = ValidationConfig::new(ValidateMask::IR | ValidateMask::CFG);
//! let mut sink = BufferSink::default();
//! assert!(shader_ir::validate::validate(&program, &config, &mut sink));
//! assert!(sink.findings.is_empty());
//! ```

#![no_std]

extern crate alloc;

pub mod analysis;
pub mod builder;
pub mod diag;
pub mod ir;
pub mod isa;
pub mod opcode;
pub mod print;
pub mod reg;
pub mod validate;

pub use ir::{Block, Definition, Instruction, Operand, Program, Temp};
pub use opcode::{Format, Opcode};
