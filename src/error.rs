// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertsyncError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("api key is blank")]
    MissingApiKey,

    #[error("failed to build alerts client: {0}")]
    ClientBuild(String),

    #[error("alerts API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("alerts API transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid alerts API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("duplicate condition name in policy spec: {0}")]
    DuplicateCondition(String),
}

impl AlertsyncError {
    /// Whether this error means the targeted resource does not exist,
    /// either remotely or in the Kubernetes API.
    pub fn is_not_found(&self) -> bool {
        match self {
            AlertsyncError::Api { status, .. } => *status == 404,
            AlertsyncError::KubeError(kube::Error::Api(err)) => err.code == 404,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AlertsyncError>;
