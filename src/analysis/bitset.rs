// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small bitset used by the analyses; indexed by temporary id.

use alloc::vec;
use alloc::vec::Vec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitSet {
    bits: Vec<u64>,
    len: usize,
}

impl BitSet {
    #[must_use]
    pub fn new_empty(len: usize) -> Self {
        let words = len.div_ceil(64);
        Self {
            bits: vec![0; words],
            len,
        }
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        let w = idx / 64;
        let b = idx % 64;
        (self.bits[w] >> b) & 1 == 1
    }

    pub fn set(&mut self, idx: usize) {
        if idx >= self.len {
            return;
        }
        let w = idx / 64;
        let b = idx % 64;
        self.bits[w] |= 1_u64 << b;
    }

    pub fn clear(&mut self, idx: usize) {
        if idx >= self.len {
            return;
        }
        let w = idx / 64;
        let b = idx % 64;
        self.bits[w] &= !(1_u64 << b);
    }

    pub fn union_with(&mut self, other: &Self) {
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a |= *b;
        }
    }

    /// Indices of all set bits, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.get(i))
    }
}
