// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Lookup of the resources the control plane created for a parent.
//!
//! Dependents are created asynchronously and their names are not known in
//! advance, so they are found through the correlation label that carries the
//! parent's name.

use crate::constants::labels;
use crate::error::Result;
use crate::kubernetes::ApiClient;
use crate::types::{Build, Release};
use crate::wait::phase::{Dependent, Phase};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::{api::ListParams, ResourceExt};
use tracing::{debug, instrument};

/// Label selector matching every dependent of `parent`
pub fn selector(parent: &str) -> String {
    format!("{}={}", labels::APPLICATION_NAME, parent)
}

/// List all dependents of kind `K` for `parent` in the client's project.
///
/// An empty list is the normal state right after the parent was submitted.
#[instrument(skip(client), fields(kind = %K::kind(&())))]
pub async fn list_dependents<K: Dependent>(client: &ApiClient, parent: &str) -> Result<Vec<K>> {
    let lp = ListParams::default().labels(&selector(parent));
    let list = client.api::<K>().list(&lp).await?;

    debug!("Found {} dependents", list.items.len());
    Ok(list.items)
}

/// Whether `item` was created at or after `bound`. Objects without a
/// creation timestamp count as new.
fn created_since<K: Dependent>(item: &K, bound: &Time) -> bool {
    item.creation_timestamp().map_or(true, |created| created.0 >= bound.0)
}

/// What a single poll saw of one dependent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub kind: &'static str,
    pub name: String,
    pub phase: Phase,
    /// Only set for failed dependents
    pub message: Option<String>,
}

impl Observation {
    pub fn of<K: Dependent>(kind: &'static str, item: &K) -> Self {
        let phase = item.classify();
        Observation {
            kind,
            name: item.name_any(),
            phase,
            message: (phase == Phase::Failed).then(|| item.failure_message()),
        }
    }
}

/// The dependent kinds a parent can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependentKind {
    Build,
    Release,
}

impl DependentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependentKind::Build => "build",
            DependentKind::Release => "release",
        }
    }

    /// List and classify every dependent of this kind
    pub async fn observe(
        self,
        client: &ApiClient,
        parent: &str,
        created_after: Option<&Time>,
    ) -> Result<(DependentKind, Vec<Observation>)> {
        let observations = match self {
            DependentKind::Build => {
                let items = list_dependents::<Build>(client, parent).await?;
                observe_since(self, items, created_after)
            }
            DependentKind::Release => {
                let items = list_dependents::<Release>(client, parent).await?;
                observe_since(self, items, created_after)
            }
        };

        Ok((self, observations))
    }
}

fn observe_all<K: Dependent>(kind: DependentKind, items: &[K]) -> Vec<Observation> {
    items
        .iter()
        .map(|item| Observation::of(kind.as_str(), item))
        .collect()
}

/// Classify the dependents created since `bound`. When there are none, the
/// newest older dependent stands in for the kind, but only if it succeeded:
/// an update that did not need a new one of this kind keeps the current one,
/// while an old failure never ends the wait.
pub fn observe_since<K: Dependent>(
    kind: DependentKind,
    items: Vec<K>,
    bound: Option<&Time>,
) -> Vec<Observation> {
    let Some(bound) = bound else {
        return observe_all(kind, &items);
    };

    let (fresh, older): (Vec<K>, Vec<K>) =
        items.into_iter().partition(|item| created_since(item, bound));
    if !fresh.is_empty() {
        return observe_all(kind, &fresh);
    }

    older
        .iter()
        .max_by_key(|item| item.creation_timestamp().map(|t| t.0))
        .map(|item| Observation::of(kind.as_str(), item))
        .filter(|observation| observation.phase == Phase::Succeeded)
        .into_iter()
        .collect()
}
