// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Health conditions reported by the control plane, shared by every resource kind.

use crate::constants::conditions::*;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    /// One of "True", "False" or "Unknown"
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,
}

impl Condition {
    pub fn new(condition_type: &str, status: bool, reason: &str) -> Self {
        Condition {
            condition_type: condition_type.to_string(),
            status: if status { "True" } else { "False" }.to_string(),
            reason: Some(reason.to_string()),
            message: None,
            last_transition_time: Some(Time(Utc::now())),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn reconcile_success() -> Self {
        Self::new(TYPE_SYNCED, true, REASON_RECONCILE_SUCCESS)
    }

    pub fn reconcile_error(message: impl Into<String>) -> Self {
        Self::new(TYPE_SYNCED, false, REASON_RECONCILE_ERROR).with_message(message)
    }

    pub fn available() -> Self {
        Self::new(TYPE_READY, true, REASON_AVAILABLE)
    }

    pub fn unavailable() -> Self {
        Self::new(TYPE_READY, false, REASON_UNAVAILABLE)
    }

    pub fn creating() -> Self {
        Self::new(TYPE_READY, false, REASON_CREATING)
    }

    pub fn is_true(&self) -> bool {
        self.status == "True"
    }
}

/// The current observation for a condition type.
///
/// The entry with the latest transition time wins; among equal times the one
/// listed last wins.
pub fn find_condition<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a Condition> {
    conditions
        .iter()
        .filter(|c| c.condition_type == condition_type)
        .max_by(|a, b| a.last_transition_time.cmp(&b.last_transition_time))
}

/// Reason and message are never consulted, only type and status.
pub fn has_condition(conditions: &[Condition], condition_type: &str, status: bool) -> bool {
    find_condition(conditions, condition_type).is_some_and(|c| c.is_true() == status)
}

/// Replace any existing condition of the same type.
pub fn set_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    conditions.retain(|c| c.condition_type != condition.condition_type);
    conditions.push(condition);
}

/// Implemented by every resource that carries a condition list in its status.
pub trait HasConditions {
    fn conditions(&self) -> &[Condition];

    fn has_condition(&self, condition_type: &str, status: bool) -> bool {
        has_condition(self.conditions(), condition_type, status)
    }

    fn condition(&self, condition_type: &str) -> Option<&Condition> {
        find_condition(self.conditions(), condition_type)
    }

    fn is_synced(&self) -> bool {
        self.has_condition(TYPE_SYNCED, true)
    }

    fn is_available(&self) -> bool {
        self.has_condition(TYPE_READY, true)
    }
}
