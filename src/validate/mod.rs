// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The validators.
//!
//! Each validator is a standalone pass over an immutable [`Program`] that
//! reports findings to a [`DiagnosticSink`] and returns whether the program
//! passed. [`validate`] runs the ones selected by the configuration.

pub mod live;
pub mod ra;
pub mod shape;
pub mod ssa;

pub use live::validate_live;
pub use ra::validate_ra;
pub use shape::validate_cfg;
pub use ssa::validate_ir;

use crate::diag::{DiagnosticSink, ValidateMask, ValidationConfig};
use crate::ir::{CompilationProgress, Program};

/// Runs the validators selected by `config` and returns whether all of them
/// passed. The register assignment check only applies once allocation has
/// happened and is skipped before that, even when selected.
pub fn validate(
    program: &Program,
    config: &ValidationConfig,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    let mut ok = true;
    if config.mask.contains(ValidateMask::IR) {
        ok &= validate_ir(program, sink);
    }
    if config.mask.contains(ValidateMask::CFG) {
        ok &= validate_cfg(program, sink);
    }
    if config.mask.contains(ValidateMask::LIVE) {
        ok &= validate_live(program, sink);
    }
    if config.mask.contains(ValidateMask::RA)
        && program.progress >= CompilationProgress::AfterRa
    {
        ok &= validate_ra(program, sink);
    }
    ok
}
