// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::env;
use url::Url;

use crate::constants::requeue;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Overrides the region-derived alerts API base URL (useful for staging
    /// environments and local API mocks)
    pub api_base_override: Option<Url>,
    /// Requeue interval after a failed reconciliation
    pub error_requeue_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            env::var("ALERTS_API_URL").ok(),
            env::var("ERROR_REQUEUE_SECS").ok(),
        )
    }

    fn from_vars(api_url: Option<String>, requeue_secs: Option<String>) -> Result<Self> {
        let api_base_override = match api_url {
            Some(raw) => Some(
                Url::parse(&raw).context("ALERTS_API_URL is not a valid URL")?,
            ),
            None => None,
        };

        let error_requeue_secs = requeue_secs
            .and_then(|v| v.parse().ok())
            .unwrap_or(requeue::ERROR_INTERVAL_SECS);

        Ok(Config {
            api_base_override,
            error_requeue_secs,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_override: None,
            error_requeue_secs: requeue::ERROR_INTERVAL_SECS,
        }
    }
}
