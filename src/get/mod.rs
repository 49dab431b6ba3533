// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reading resources back from the control plane.

pub mod postgres;

pub use postgres::GetPostgres;
