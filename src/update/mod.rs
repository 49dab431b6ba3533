// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Read-modify-write updates of existing resources.
//!
//! Writes carry the resourceVersion that was read, so a concurrent change
//! makes the update fail with [`TideError::Conflict`]. Retrying from a fresh
//! read is left to the caller.

pub mod application;

pub use application::UpdateApplication;

use crate::error::{Result, TideError};
use crate::kubernetes::ApiClient;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::PostParams;
use kube::core::NamespaceResourceScope;
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::{info, instrument};

/// Server-side time of the latest write to `object`, as recorded in its managed fields
pub fn last_write_time<K: Resource>(object: &K) -> Option<Time> {
    object
        .meta()
        .managed_fields
        .as_ref()?
        .iter()
        .filter_map(|entry| entry.time.clone())
        .max_by_key(|time| time.0)
}

pub struct Updater<K> {
    client: ApiClient,
    name: String,
    _kind: PhantomData<K>,
}

impl<K> Updater<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Serialize
        + DeserializeOwned
        + Debug,
{
    pub fn new(client: ApiClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
            _kind: PhantomData,
        }
    }

    fn kind() -> String {
        K::kind(&()).to_string()
    }

    /// Fetch the current state of the object
    pub async fn fetch(&self) -> Result<K> {
        self.client
            .api::<K>()
            .get(&self.name)
            .await
            .map_err(|e| TideError::from_api(e, &Self::kind(), &self.name))
    }

    /// Write `object` back. Fails with a conflict if it was changed since it was fetched.
    pub async fn submit(&self, object: &K) -> Result<K> {
        let updated = self
            .client
            .api::<K>()
            .replace(&self.name, &PostParams::default(), object)
            .await
            .map_err(|e| TideError::from_api(e, &Self::kind(), &self.name))?;

        info!("Updated {} {:?}", Self::kind(), self.name);
        Ok(updated)
    }

    /// Fetch, apply `f`, and submit
    #[instrument(skip(self, f), fields(kind = %Self::kind(), name = %self.name))]
    pub async fn update<F>(&self, f: F) -> Result<K>
    where
        F: FnOnce(&mut K) -> Result<()>,
    {
        let mut current = self.fetch().await?;
        f(&mut current)?;
        self.submit(&current).await
    }
}
