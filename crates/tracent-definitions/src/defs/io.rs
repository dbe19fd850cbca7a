// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! I/O files and handles.
//!
//! An I/O handle is registered in two steps: created when the adapter first
//! observes it, then *completed* once with its final name and file. Only
//! the creation-time fields are identity.

use super::{communicator::CommunicatorHandle, string::StringHandle};
use std::ops::BitOr;
use tracent_memory::Handle;

pub type IoFileHandle = Handle<IoFileDef>;
pub type IoHandleHandle = Handle<IoHandleDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoParadigm {
    Posix,
    Isoc,
    Mpi,
    Netcdf,
}

/// Property flags of an I/O handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IoHandleFlags(u32);

impl IoHandleFlags {
    pub const NONE: IoHandleFlags = IoHandleFlags(0);
    /// Created by the runtime before measurement (stdin, stdout, stderr).
    pub const PRE_CREATED: IoHandleFlags = IoHandleFlags(1);
    /// Visible to every process of the paradigm, not just its creator.
    pub const ALL_PROXY: IoHandleFlags = IoHandleFlags(2);

    pub fn contains(self, other: IoHandleFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for IoHandleFlags {
    type Output = IoHandleFlags;

    fn bitor(self, rhs: IoHandleFlags) -> IoHandleFlags {
        IoHandleFlags(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct IoFileDef {
    pub file_name: StringHandle,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct IoHandleDef {
    pub name: StringHandle,
    pub file: Option<IoFileHandle>,
    pub paradigm: IoParadigm,
    pub flags: IoHandleFlags,
    /// Processes sharing the handle; `None` means process-local.
    pub scope: Option<CommunicatorHandle>,
    pub parent: Option<IoHandleHandle>,
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine_and_test() {
        let flags = IoHandleFlags::PRE_CREATED | IoHandleFlags::ALL_PROXY;
        assert!(flags.contains(IoHandleFlags::PRE_CREATED));
        assert!(flags.contains(IoHandleFlags::ALL_PROXY));
        assert!(!IoHandleFlags::NONE.contains(IoHandleFlags::PRE_CREATED));
    }
}
