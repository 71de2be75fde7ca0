// ABOUTME: System-wide constants re-exported from foodgram-core
// ABOUTME: Field limits, short-link alphabet, pagination defaults and endpoint paths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use foodgram_core::constants::*;
