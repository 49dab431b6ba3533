// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiting for submitted resources to converge.

pub mod dependents;
pub mod phase;
pub mod waiter;

pub use dependents::{list_dependents, DependentKind, Observation};
pub use phase::{Dependent, Phase};
pub use waiter::{evaluate, Converge, ConvergenceWaiter, Verdict};
