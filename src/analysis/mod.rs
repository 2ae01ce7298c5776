// Copyright 2026 the Shader IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Program analyses shared by the validators: dominance over either control
//! flow graph and a liveness/register-demand recomputation.

pub mod bitset;
pub mod domination;
pub mod liveness;
