// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Connection to the control plane API.

pub mod client;

pub use client::ApiClient;
