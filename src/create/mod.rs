// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Submitting new resources, optionally waiting for them to become ready.

pub mod application;
pub mod postgres;
pub mod project;

pub use application::{CreateApplication, GitConfig};
pub use postgres::CreatePostgres;
pub use project::CreateProject;
