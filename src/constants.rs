// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

/// Finalizer names guarding external cleanup of each resource kind
pub mod finalizers {
    pub const POLICY: &str = "policies.finalizers.alertsync.dev";
    pub const CONDITION: &str = "alertconditions.finalizers.alertsync.dev";
    pub const CHANNEL: &str = "alertschannels.finalizers.alertsync.dev";
}

/// The operator name used for field management
pub const OPERATOR_NAME: &str = "alertsync";

/// Remote alerts API configuration
pub mod api {
    /// Base URL for the US region
    pub const US_ENDPOINT: &str = "https://api.newrelic.com";
    /// Base URL for the EU region
    pub const EU_ENDPOINT: &str = "https://api.eu.newrelic.com";
    /// How many characters of an API key may appear in logs
    pub const PARTIAL_KEY_LEN: usize = 8;
}

/// Requeue configuration
pub mod requeue {
    /// Default requeue interval in seconds after a reconciliation error
    pub const ERROR_INTERVAL_SECS: u64 = 60;
}
