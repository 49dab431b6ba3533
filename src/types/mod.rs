// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource kinds served by the control plane.

pub mod application;
pub mod build;
pub mod condition;
pub mod postgres;
pub mod project;
pub mod release;

pub use application::{Application, ApplicationSpec, ApplicationStatus};
pub use build::{Build, BuildSpec, BuildState, BuildStatus};
pub use condition::{Condition, HasConditions};
pub use postgres::{Postgres, PostgresSpec, PostgresStatus};
pub use project::{Project, ProjectSpec, ProjectStatus};
pub use release::{Release, ReleaseSpec, ReleaseState, ReleaseStatus};
