// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Validation findings, sinks and pass selection.
//!
//! Validators never abort on the first problem; they report every finding to
//! a [`DiagnosticSink`] and return an overall verdict. Hosts that want the
//! findings on stderr or in a log wire their own sink in; tests usually use
//! [`BufferSink`] and assert on its contents.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Broad category of a finding, for filtering and test assertions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FindingKind {
    /// Malformed graph or block structure.
    Structural,
    /// A single-assignment or dominance violation.
    Ssa,
    /// A register class or width mismatch.
    Type,
    /// An encoding rule violation for the instruction's hardware format.
    Format,
    /// A register assignment problem.
    Allocation,
    /// Cached liveness disagrees with a fresh recomputation.
    Liveness,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Structural => "structural",
            Self::Ssa => "ssa",
            Self::Type => "type",
            Self::Format => "format",
            Self::Allocation => "allocation",
            Self::Liveness => "liveness",
        };
        f.write_str(s)
    }
}

/// One problem found in a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    /// Category.
    pub kind: FindingKind,
    /// Block the problem was found in.
    pub block: u32,
    /// Human-readable description.
    pub message: String,
    /// Printed form of the offending instruction, when there is one.
    pub instr: Option<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: BB{}: {}", self.kind, self.block, self.message)?;
        if let Some(instr) = &self.instr {
            write!(f, ": {instr}")?;
        }
        Ok(())
    }
}

/// Receiver for validation findings.
///
/// The default method drops everything, so a host only implements what it
/// cares about.
pub trait DiagnosticSink {
    /// Called once per finding, in discovery order.
    fn report(&mut self, _finding: Finding) {}
}

/// Sink that keeps every finding in memory.
#[derive(Default, Debug)]
pub struct BufferSink {
    /// All findings reported so far, in order.
    pub findings: Vec<Finding>,
}

impl DiagnosticSink for BufferSink {
    fn report(&mut self, finding: Finding) {
        self.findings.push(finding);
    }
}

/// Sink that formats findings into any [`fmt::Write`], one per line.
#[derive(Debug)]
pub struct FmtSink<W> {
    out: W,
}

impl<W: fmt::Write> FmtSink<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the sink, returning the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: fmt::Write> DiagnosticSink for FmtSink<W> {
    fn report(&mut self, finding: Finding) {
        let _ = writeln!(self.out, "{finding}");
    }
}

/// Bitmask selecting which validators run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ValidateMask(u32);

impl ValidateMask {
    /// Nothing runs.
    pub const NONE: Self = Self(0);
    /// Structural and SSA validation.
    pub const IR: Self = Self(1 << 0);
    /// Control flow shape validation.
    pub const CFG: Self = Self(1 << 1);
    /// Liveness cross-check.
    pub const LIVE: Self = Self(1 << 2);
    /// Register assignment validation.
    pub const RA: Self = Self(1 << 3);
    /// Everything.
    pub const ALL: Self = Self(0xf);

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parses a comma-separated pass list, e.g. `"ir,ra"`. Unknown names are
    /// ignored; `"all"` selects everything.
    #[must_use]
    pub fn from_debug_str(s: &str) -> Self {
        let mut mask = Self::NONE;
        for part in s.split(',') {
            mask |= match part.trim() {
                "ir" => Self::IR,
                "cfg" => Self::CFG,
                "live" => Self::LIVE,
                "ra" => Self::RA,
                "all" => Self::ALL,
                _ => Self::NONE,
            };
        }
        mask
    }
}

impl BitOr for ValidateMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ValidateMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Configuration for a validation run.
#[derive(Copy, Clone, Debug)]
pub struct ValidationConfig {
    /// Which validators run.
    pub mask: ValidateMask,
}

impl ValidationConfig {
    #[must_use]
    pub const fn new(mask: ValidateMask) -> Self {
        Self { mask }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::new(ValidateMask::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn mask_parsing() {
        let mask = ValidateMask::from_debug_str("ir, ra");
        assert!(mask.contains(ValidateMask::IR));
        assert!(mask.contains(ValidateMask::RA));
        assert!(!mask.contains(ValidateMask::LIVE));
        assert!(ValidateMask::from_debug_str("all").contains(ValidateMask::CFG));
        assert_eq!(ValidateMask::from_debug_str("bogus"), ValidateMask::NONE);
    }

    #[test]
    fn finding_display() {
        let finding = Finding {
            kind: FindingKind::Ssa,
            block: 3,
            message: "temporary %4 used before definition".to_string(),
            instr: Some("v1: %5 = v_mov_b32 %4".to_string()),
        };
        assert_eq!(
            finding.to_string(),
            "ssa: BB3: temporary %4 used before definition: v1: %5 = v_mov_b32 %4"
        );
    }

    #[test]
    fn buffer_sink_preserves_order() {
        let mut sink = BufferSink::default();
        for block in 0..3 {
            sink.report(Finding {
                kind: FindingKind::Structural,
                block,
                message: "x".to_string(),
                instr: None,
            });
        }
        assert_eq!(sink.findings.len(), 3);
        assert_eq!(sink.findings[1].block, 1);
    }
}
