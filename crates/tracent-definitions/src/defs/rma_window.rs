// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! RMA windows: named one-sided-communication windows over a communicator.

use super::{communicator::CommunicatorHandle, string::StringHandle};
use tracent_memory::Handle;

pub type RmaWindowHandle = Handle<RmaWindowDef>;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RmaWindowDef {
    pub name: StringHandle,
    pub communicator: CommunicatorHandle,
}
