// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Attributes: typed key declarations for attaching extra values to events.

use super::string::StringHandle;
use tracent_memory::Handle;

pub type AttributeHandle = Handle<AttributeDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Uint64,
    Int64,
    Double,
    String,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct AttributeDef {
    pub name: StringHandle,
    pub description: StringHandle,
    pub attribute_type: AttributeType,
}
