// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Metric descriptors: hardware counters, resource-usage values, user
//! metrics. A metric value in the event stream is scaled as
//! `value * base^exponent` in the named unit.

use super::string::StringHandle;
use tracent_memory::Handle;

pub type MetricHandle = Handle<MetricDef>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricSourceType {
    Papi,
    Rusage,
    User,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricMode {
    AccumulatedStart,
    AccumulatedPoint,
    AbsolutePoint,
    AbsoluteLast,
    AbsoluteNext,
    RelativePoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricValueType {
    Int64,
    Uint64,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricBase {
    Binary,
    Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricProfilingType {
    Exclusive,
    Inclusive,
    Simple,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct MetricDef {
    pub name: StringHandle,
    pub description: StringHandle,
    pub source_type: MetricSourceType,
    pub mode: MetricMode,
    pub value_type: MetricValueType,
    pub base: MetricBase,
    pub exponent: i64,
    pub unit: StringHandle,
    pub profiling_type: MetricProfilingType,
}
