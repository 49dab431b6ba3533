// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Blocks until a submitted resource and everything the control plane
//! creates for it has converged, failed, or the deadline passed.

use crate::config::WaitConfig;
use crate::error::{Result, TideError};
use crate::kubernetes::ApiClient;
use crate::types::{Application, HasConditions, Postgres, Project};
use crate::wait::dependents::{DependentKind, Observation};
use crate::wait::phase::Phase;
use futures::future::try_join_all;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::core::NamespaceResourceScope;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

/// A resource whose own status tells whether the control plane has caught up with it
pub trait Converge:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + HasConditions
    + Clone
    + DeserializeOwned
    + Debug
    + Send
    + Sync
    + 'static
{
    fn is_converged(&self) -> bool;

    /// Dependent kinds that must all succeed before the parent counts as converged
    fn required_dependents() -> &'static [DependentKind] {
        &[]
    }
}

impl Converge for Application {
    fn is_converged(&self) -> bool {
        self.is_ready()
    }

    fn required_dependents() -> &'static [DependentKind] {
        &[DependentKind::Build, DependentKind::Release]
    }
}

impl Converge for Project {
    fn is_converged(&self) -> bool {
        self.is_available()
    }
}

impl Converge for Postgres {
    fn is_converged(&self) -> bool {
        self.is_available()
    }
}

/// Aggregate state of all dependents seen in one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pending,
    Succeeded,
    Failed(Observation),
}

/// Decide the aggregate state of the dependents seen in one poll.
///
/// Any failure wins immediately. Success needs at least one dependent of
/// every required kind and every observed dependent succeeded.
pub fn evaluate(required: &[DependentKind], observed: &[(DependentKind, Vec<Observation>)]) -> Verdict {
    if let Some(failed) = observed
        .iter()
        .flat_map(|(_, items)| items)
        .find(|o| o.phase == Phase::Failed)
    {
        return Verdict::Failed(failed.clone());
    }

    let kind_converged = |kind: &DependentKind| {
        observed
            .iter()
            .filter(|(k, _)| k == kind)
            .any(|(_, items)| !items.is_empty())
    };
    let all_succeeded = observed
        .iter()
        .flat_map(|(_, items)| items)
        .all(|o| o.phase == Phase::Succeeded);

    if required.iter().all(kind_converged) && all_succeeded {
        Verdict::Succeeded
    } else {
        Verdict::Pending
    }
}

/// Longest wait the deadline is built from. Larger timeouts are clamped.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn deadline(start: Instant, timeout: Duration) -> Instant {
    start + timeout.min(FAR_FUTURE)
}

enum Tick<P> {
    ParentPending,
    DependentsPending { pending: usize, succeeded: usize },
    Converged(P),
}

/// One wait session for a single parent resource
pub struct ConvergenceWaiter<P> {
    client: ApiClient,
    namespace: String,
    name: String,
    config: WaitConfig,
    created_after: Option<Time>,
    _parent: PhantomData<P>,
}

impl<P: Converge> ConvergenceWaiter<P> {
    pub fn new(client: ApiClient, name: impl Into<String>, config: WaitConfig) -> Self {
        Self {
            namespace: client.project.clone(),
            client,
            name: name.into(),
            config,
            created_after: None,
            _parent: PhantomData,
        }
    }

    /// Look the parent up in `namespace` instead of the current project
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Ignore dependents created before `bound`, e.g. leftovers of an earlier revision
    pub fn created_after(mut self, bound: Time) -> Self {
        self.created_after = Some(bound);
        self
    }

    fn kind() -> String {
        P::kind(&()).to_string()
    }

    /// Wait until converged, failed or timed out
    pub async fn wait(&self) -> Result<P> {
        self.wait_with_cancel(std::future::pending()).await
    }

    /// Wait, giving up early when the user interrupts the process
    pub async fn wait_interruptible(&self) -> Result<P> {
        self.wait_with_cancel(interrupted()).await
    }

    /// Like [`wait`](Self::wait), but gives up as soon as `cancel` completes
    pub async fn wait_with_cancel<F>(&self, cancel: F) -> Result<P>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.poll() => result,
            _ = cancel => {
                warn!("Stopped waiting for {} {:?}", Self::kind(), self.name);
                Err(TideError::Cancelled {
                    kind: Self::kind(),
                    name: self.name.clone(),
                })
            }
        }
    }

    #[instrument(skip(self), fields(kind = %Self::kind(), name = %self.name, timeout = ?self.config.timeout))]
    async fn poll(&self) -> Result<P> {
        let start = Instant::now();
        let deadline = deadline(start, self.config.timeout);
        let mut parent_ready = false;

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(TideError::Timeout {
                    kind: Self::kind(),
                    name: self.name.clone(),
                    elapsed: start.elapsed(),
                });
            }

            match tokio::time::timeout_at(deadline, self.tick()).await {
                Err(_) => continue,
                Ok(Ok(Tick::Converged(parent))) => {
                    info!("{} {:?} is ready after {:?}", Self::kind(), self.name, start.elapsed());
                    return Ok(parent);
                }
                Ok(Ok(Tick::ParentPending)) => {
                    debug!("Waiting for {} {:?} to be reconciled", Self::kind(), self.name);
                }
                Ok(Ok(Tick::DependentsPending { pending, succeeded })) => {
                    if !parent_ready {
                        info!("{} {:?} reconciled, waiting for builds and releases", Self::kind(), self.name);
                        parent_ready = true;
                    }
                    debug!(pending, succeeded, "Dependents not converged yet");
                }
                Ok(Err(e)) if e.is_terminal() => return Err(e),
                Ok(Err(e)) => {
                    warn!("Error checking {} {:?}: {}, retrying...", Self::kind(), self.name, e);
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(self.config.poll_interval.min(remaining)).await;
        }
    }

    async fn tick(&self) -> Result<Tick<P>> {
        let api: Api<P> = self.client.api_in(&self.namespace);
        let parent = api
            .get(&self.name)
            .await
            .map_err(|e| TideError::from_api(e, &Self::kind(), &self.name))?;

        if !parent.is_converged() {
            return Ok(Tick::ParentPending);
        }

        let required = P::required_dependents();
        if required.is_empty() {
            return Ok(Tick::Converged(parent));
        }

        let observed = try_join_all(
            required
                .iter()
                .map(|kind| kind.observe(&self.client, &self.name, self.created_after.as_ref())),
        )
        .await?;

        match evaluate(required, &observed) {
            Verdict::Succeeded => Ok(Tick::Converged(parent)),
            Verdict::Failed(observation) => Err(TideError::DependentFailed {
                kind: observation.kind.to_string(),
                name: observation.name,
                message: observation.message.unwrap_or_default(),
            }),
            Verdict::Pending => {
                let items = || observed.iter().flat_map(|(_, items)| items);
                Ok(Tick::DependentsPending {
                    pending: items().filter(|o| !o.phase.is_terminal()).count(),
                    succeeded: items().filter(|o| o.phase == Phase::Succeeded).count(),
                })
            }
        }
    }
}

async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        // without a signal handler only the deadline can end the wait
        std::future::pending::<()>().await;
    }
}
