// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Classification of dependent resources into pending, succeeded or failed.

use crate::constants::conditions::TYPE_READY;
use crate::types::{Build, BuildState, HasConditions, Release, ReleaseState};
use kube::core::NamespaceResourceScope;
use kube::Resource;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pending,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::Pending)
    }
}

pub fn classify_build(state: BuildState) -> Phase {
    match state {
        BuildState::Running | BuildState::Unknown => Phase::Pending,
        BuildState::Success => Phase::Succeeded,
        BuildState::Failed => Phase::Failed,
    }
}

pub fn classify_release(state: ReleaseState) -> Phase {
    match state {
        ReleaseState::Pending | ReleaseState::Unknown => Phase::Pending,
        ReleaseState::Available => Phase::Succeeded,
        ReleaseState::Failed => Phase::Failed,
    }
}

/// Without a reported state only a `Ready=True` condition counts, and never as a failure.
fn classify_by_condition<R: HasConditions>(resource: &R) -> Phase {
    if resource.has_condition(TYPE_READY, true) {
        Phase::Succeeded
    } else {
        Phase::Pending
    }
}

/// A resource the control plane creates on behalf of a parent and labels with its name
pub trait Dependent:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + HasConditions
    + Clone
    + DeserializeOwned
    + Debug
    + Send
    + Sync
    + 'static
{
    fn classify(&self) -> Phase;

    /// Human readable explanation of a failure, display only
    fn failure_message(&self) -> String {
        self.condition(TYPE_READY)
            .and_then(|c| c.message.clone())
            .unwrap_or_else(|| "no further details reported".to_string())
    }
}

impl Dependent for Build {
    fn classify(&self) -> Phase {
        match self.state() {
            Some(state) => classify_build(state),
            None => classify_by_condition(self),
        }
    }
}

impl Dependent for Release {
    fn classify(&self) -> Phase {
        match self.state() {
            Some(state) => classify_release(state),
            None => classify_by_condition(self),
        }
    }
}
