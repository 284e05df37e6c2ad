// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types and shared metadata helpers.

pub mod channel;
pub mod condition;
pub mod policy;

use kube::api::ObjectMeta;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to a Kubernetes Secret holding the alerts API key
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeySecret {
    pub name: String,
    pub namespace: String,
    /// Data field inside the secret that holds the key
    pub key_name: String,
}

pub fn has_finalizer(meta: &ObjectMeta, finalizer: &str) -> bool {
    meta.finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|v| v == finalizer))
}

/// Add the finalizer if absent. Returns true if the metadata was changed.
pub fn add_finalizer(meta: &mut ObjectMeta, finalizer: &str) -> bool {
    if has_finalizer(meta, finalizer) {
        return false;
    }
    meta.finalizers
        .get_or_insert_with(Vec::new)
        .push(finalizer.to_string());
    true
}

pub fn remove_finalizer(meta: &mut ObjectMeta, finalizer: &str) {
    if let Some(finalizers) = meta.finalizers.as_mut() {
        finalizers.retain(|v| v != finalizer);
    }
}
