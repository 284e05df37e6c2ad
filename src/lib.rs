// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0
pub mod alerts;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod hash;
pub mod reconcilers;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
