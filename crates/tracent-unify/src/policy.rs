// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

/// Knobs that change what counts as "the same definition" across processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnifyPolicy {
    /// Whether two regions that differ only in paradigm stay distinct.
    /// Mixed-paradigm measurements want `true`; tools that fold runtime
    /// wrappers onto their user-code counterparts set `false`.
    pub region_paradigm_significant: bool,
}

impl Default for UnifyPolicy {
    fn default() -> Self {
        UnifyPolicy {
            region_paradigm_significant: true,
        }
    }
}
