// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod cli;
pub mod config;
pub mod constants;
pub mod create;
pub mod error;
pub mod get;
pub mod kubernetes;
pub mod types;
pub mod update;
pub mod wait;

#[cfg(test)]
pub mod test_utils;
