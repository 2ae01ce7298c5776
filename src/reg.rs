// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Register banks, register classes and physical registers.
//!
//! The physical register file is byte addressable: scalar registers occupy
//! dwords `0..256`, vector registers dwords `256..512`. A [`PhysReg`] stores a
//! byte address into that 2048-byte space so subdword assignments can be
//! expressed directly.

use core::fmt;

/// The register bank a value lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RegBank {
    /// Scalar (wave-uniform) registers.
    Sgpr,
    /// Vector (per-lane) registers.
    Vgpr,
    /// Vector registers with scalar-like (linear) lifetime, used for values
    /// that must survive divergent control flow.
    LinearVgpr,
}

impl RegBank {
    /// Returns `true` for both plain and linear vector registers.
    #[must_use]
    pub const fn is_vgpr(self) -> bool {
        matches!(self, Self::Vgpr | Self::LinearVgpr)
    }
}

/// A register class: bank, size and subdword/lane-mask attributes.
///
/// Two classes are equal iff all fields match; the lane-mask flag
/// distinguishes wave-boolean values from plain scalars of the same width.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RegClass {
    bank: RegBank,
    bytes: u32,
    subdword: bool,
    lane_mask: bool,
}

impl RegClass {
    /// 1-dword scalar.
    pub const S1: Self = Self::scalar(1);
    /// 2-dword scalar.
    pub const S2: Self = Self::scalar(2);
    /// 3-dword scalar.
    pub const S3: Self = Self::scalar(3);
    /// 4-dword scalar.
    pub const S4: Self = Self::scalar(4);
    /// 8-dword scalar.
    pub const S8: Self = Self::scalar(8);
    /// 1-dword vector.
    pub const V1: Self = Self::vector(1);
    /// 2-dword vector.
    pub const V2: Self = Self::vector(2);
    /// 3-dword vector.
    pub const V3: Self = Self::vector(3);
    /// 4-dword vector.
    pub const V4: Self = Self::vector(4);
    /// 1-byte subdword vector.
    pub const V1B: Self = Self::subdword_vector(1);
    /// 2-byte subdword vector.
    pub const V2B: Self = Self::subdword_vector(2);
    /// 3-byte subdword vector.
    pub const V3B: Self = Self::subdword_vector(3);
    /// 6-byte subdword vector.
    pub const V6B: Self = Self::subdword_vector(6);

    /// A scalar class of `dwords` dwords.
    #[must_use]
    pub const fn scalar(dwords: u32) -> Self {
        Self {
            bank: RegBank::Sgpr,
            bytes: dwords * 4,
            subdword: false,
            lane_mask: false,
        }
    }

    /// A vector class of `dwords` dwords.
    #[must_use]
    pub const fn vector(dwords: u32) -> Self {
        Self {
            bank: RegBank::Vgpr,
            bytes: dwords * 4,
            subdword: false,
            lane_mask: false,
        }
    }

    /// A subdword vector class of `bytes` bytes.
    #[must_use]
    pub const fn subdword_vector(bytes: u32) -> Self {
        Self {
            bank: RegBank::Vgpr,
            bytes,
            subdword: true,
            lane_mask: false,
        }
    }

    /// A linear vector class of `dwords` dwords.
    #[must_use]
    pub const fn linear_vgpr(dwords: u32) -> Self {
        Self {
            bank: RegBank::LinearVgpr,
            bytes: dwords * 4,
            subdword: false,
            lane_mask: false,
        }
    }

    /// The wave-boolean (lane mask) class for `wave_size` lanes.
    #[must_use]
    pub const fn lane_mask(wave_size: u32) -> Self {
        Self {
            bank: RegBank::Sgpr,
            bytes: wave_size / 8,
            subdword: false,
            lane_mask: true,
        }
    }

    /// The register bank of this class.
    #[must_use]
    pub const fn bank(self) -> RegBank {
        self.bank
    }

    /// Size in bytes.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        self.bytes
    }

    /// Size in dwords, rounding subdword classes up.
    #[must_use]
    pub const fn size(self) -> u32 {
        self.bytes.div_ceil(4)
    }

    /// Returns `true` if the class is narrower than the native dword granule.
    #[must_use]
    pub const fn is_subdword(self) -> bool {
        self.subdword
    }

    /// Returns `true` if the class is a wave-boolean lane mask.
    #[must_use]
    pub const fn is_lane_mask(self) -> bool {
        self.lane_mask
    }

    /// Returns `true` for linear control flow lifetimes: all scalars plus
    /// linear VGPRs. Linear values follow the linear CFG for dominance.
    #[must_use]
    pub const fn is_linear(self) -> bool {
        matches!(self.bank, RegBank::Sgpr | RegBank::LinearVgpr)
    }

    /// Returns `true` for linear vector registers specifically.
    #[must_use]
    pub const fn is_linear_vgpr(self) -> bool {
        matches!(self.bank, RegBank::LinearVgpr)
    }
}

impl fmt::Display for RegClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.bank {
            RegBank::Sgpr => "s",
            RegBank::Vgpr => "v",
            RegBank::LinearVgpr => "lv",
        };
        if self.subdword {
            write!(f, "{prefix}{}b", self.bytes)
        } else {
            write!(f, "{prefix}{}", self.bytes / 4)
        }
    }
}

/// Number of addressable scalar dwords in the simulated register file.
pub const SGPR_FILE_DWORDS: u32 = 256;
/// Number of addressable vector dwords in the simulated register file.
pub const VGPR_FILE_DWORDS: u32 = 256;
/// Total simulated register file size in bytes (scalar + vector banks).
pub const REG_FILE_BYTES: usize = ((SGPR_FILE_DWORDS + VGPR_FILE_DWORDS) * 4) as usize;

/// A physical register location, stored as a byte address into the combined
/// scalar+vector register file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysReg {
    reg_b: u32,
}

impl PhysReg {
    /// A scalar register by dword index.
    #[must_use]
    pub const fn sgpr(index: u32) -> Self {
        Self { reg_b: index * 4 }
    }

    /// A vector register by dword index (`vgpr(0)` is `v0`).
    #[must_use]
    pub const fn vgpr(index: u32) -> Self {
        Self {
            reg_b: (SGPR_FILE_DWORDS + index) * 4,
        }
    }

    /// A register from a raw byte address.
    #[must_use]
    pub const fn from_byte(reg_b: u32) -> Self {
        Self { reg_b }
    }

    /// Dword index into the combined file (`256..512` is the vector bank).
    #[must_use]
    pub const fn reg(self) -> u32 {
        self.reg_b / 4
    }

    /// Byte offset within the dword (`0..4`).
    #[must_use]
    pub const fn byte(self) -> u32 {
        self.reg_b % 4
    }

    /// Byte address into the combined file.
    #[must_use]
    pub const fn reg_b(self) -> u32 {
        self.reg_b
    }

    /// The register `bytes` bytes past this one.
    #[must_use]
    pub const fn advance(self, bytes: u32) -> Self {
        Self {
            reg_b: self.reg_b + bytes,
        }
    }
}

impl fmt::Display for PhysReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.reg();
        if *self == VCC {
            write!(f, "vcc")?;
        } else if *self == M0 {
            write!(f, "m0")?;
        } else if *self == EXEC {
            write!(f, "exec")?;
        } else if *self == SCC {
            write!(f, "scc")?;
        } else if reg >= SGPR_FILE_DWORDS {
            write!(f, "v{}", reg - SGPR_FILE_DWORDS)?;
        } else {
            write!(f, "s{reg}")?;
        }
        if self.byte() != 0 {
            write!(f, ".b{}", self.byte())?;
        }
        Ok(())
    }
}

/// Vector condition code register (`s106`, 2 dwords on wave64).
pub const VCC: PhysReg = PhysReg::sgpr(106);
/// Memory address helper register.
pub const M0: PhysReg = PhysReg::sgpr(124);
/// Execution mask register (`s126`, 2 dwords on wave64).
pub const EXEC: PhysReg = PhysReg::sgpr(126);
/// Scalar condition code flag, modeled at a reserved dword index.
pub const SCC: PhysReg = PhysReg::sgpr(253);

/// Per-generation register budgets consumed by the allocation validator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Vector registers available to the allocator.
    pub num_vgprs: u32,
    /// Scalar registers available to the allocator.
    pub num_sgprs: u32,
    /// First scalar dword reserved for fixed address registers (vcc, exec,
    /// m0, ...). Assignments at or above this index bypass the budget check.
    pub sgpr_limit: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            num_vgprs: 256,
            num_sgprs: 102,
            sgpr_limit: 106,
        }
    }
}

/// Register pressure split by bank, in dword units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterDemand {
    /// Vector dwords simultaneously live.
    pub vgpr: u32,
    /// Scalar dwords simultaneously live.
    pub sgpr: u32,
}

impl RegisterDemand {
    /// Adds the footprint of one value of class `rc`.
    pub fn grow(&mut self, rc: RegClass) {
        if rc.bank().is_vgpr() {
            self.vgpr += rc.size();
        } else {
            self.sgpr += rc.size();
        }
    }

    /// Removes the footprint of one value of class `rc`.
    pub fn shrink(&mut self, rc: RegClass) {
        if rc.bank().is_vgpr() {
            self.vgpr -= rc.size();
        } else {
            self.sgpr -= rc.size();
        }
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max_with(self, other: Self) -> Self {
        Self {
            vgpr: self.vgpr.max(other.vgpr),
            sgpr: self.sgpr.max(other.sgpr),
        }
    }
}

impl fmt::Display for RegisterDemand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} vgpr, {} sgpr)", self.vgpr, self.sgpr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regclass_equality_is_field_wise() {
        assert_eq!(RegClass::S2, RegClass::scalar(2));
        assert_ne!(RegClass::S2, RegClass::lane_mask(64));
        assert_ne!(RegClass::V2B, RegClass::V1B);
        assert_eq!(RegClass::lane_mask(32).bytes(), 4);
        assert_eq!(RegClass::lane_mask(64).bytes(), 8);
    }

    #[test]
    fn subdword_sizes_round_up() {
        assert_eq!(RegClass::V1B.size(), 1);
        assert_eq!(RegClass::V3B.size(), 1);
        assert_eq!(RegClass::V6B.size(), 2);
        assert!(RegClass::V6B.is_subdword());
        assert!(!RegClass::V2.is_subdword());
    }

    #[test]
    fn physreg_banks_and_bytes() {
        assert_eq!(PhysReg::sgpr(5).reg(), 5);
        assert_eq!(PhysReg::vgpr(0).reg(), 256);
        assert_eq!(PhysReg::vgpr(3).advance(2).byte(), 2);
        assert_eq!(PhysReg::vgpr(3).advance(4), PhysReg::vgpr(4));
        assert!(RegClass::linear_vgpr(1).is_linear());
        assert!(RegClass::S1.is_linear());
        assert!(!RegClass::V1.is_linear());
    }
}
