// Copyright (c) Tracent Contributors
// SPDX-License-Identifier: Apache-2.0

//! Subsystem lifecycle hooks around measurement and unification.
//!
//! Adapters that need to patch up their definitions before they are merged
//! (or consume the unified result afterwards) register a [`Subsystem`] and
//! get called back at the fixed points of the measurement lifecycle.

use crate::policy::UnifyPolicy;
use anyhow::{bail, Result};
use tracent_definitions::defs::LocationHandle;
use tracent_definitions::DefinitionManager;

#[allow(unused_variables)]
pub trait Subsystem: Send {
    /// Stable name used for registration and diagnostics.
    fn name(&self) -> &'static str;

    /// Called once at registration, before measurement starts.
    fn register(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called when measurement begins.
    fn init(&mut self, manager: &DefinitionManager) -> Result<()> {
        Ok(())
    }

    /// Called for every location as it is created.
    fn init_location(&mut self, location: LocationHandle) {}

    /// Called after measurement ends, before the managers are merged.
    /// The hook may still create definitions in the local managers.
    fn pre_unify(&mut self, locals: &mut [&mut DefinitionManager]) -> Result<()> {
        Ok(())
    }

    /// Called after the merge, with the mappings already filled in.
    fn post_unify(
        &mut self,
        locals: &mut [&mut DefinitionManager],
        unified: &DefinitionManager,
    ) -> Result<()> {
        Ok(())
    }

    /// Called last, in reverse registration order.
    fn finalize(&mut self) {}
}

#[derive(Default)]
pub struct SubsystemRegistry {
    subsystems: Vec<Box<dyn Subsystem>>,
}

impl SubsystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subsystem. Names must be unique.
    pub fn register(&mut self, mut subsystem: Box<dyn Subsystem>) -> Result<()> {
        let name = subsystem.name();
        if self.subsystems.iter().any(|s| s.name() == name) {
            bail!("subsystem {name:?} registered twice");
        }
        subsystem.register()?;
        log::debug!("registered subsystem {name:?}");
        self.subsystems.push(subsystem);
        Ok(())
    }

    pub fn init(&mut self, manager: &DefinitionManager) -> Result<()> {
        for subsystem in &mut self.subsystems {
            subsystem.init(manager)?;
        }
        Ok(())
    }

    pub fn init_location(&mut self, location: LocationHandle) {
        for subsystem in &mut self.subsystems {
            subsystem.init_location(location);
        }
    }

    /// Runs the full unification sequence: `pre_unify` hooks, the merge,
    /// then `post_unify` hooks with the unified manager.
    pub fn unify(
        &mut self,
        locals: &mut [&mut DefinitionManager],
        policy: &UnifyPolicy,
    ) -> Result<DefinitionManager> {
        for subsystem in &mut self.subsystems {
            subsystem.pre_unify(locals)?;
        }
        let unified = crate::unify(locals, policy);
        for subsystem in &mut self.subsystems {
            subsystem.post_unify(locals, &unified)?;
        }
        Ok(unified)
    }

    pub fn finalize(&mut self) {
        for subsystem in self.subsystems.iter_mut().rev() {
            subsystem.finalize();
        }
    }
}
