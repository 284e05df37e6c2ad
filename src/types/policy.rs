// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::alerts::AlertPolicy;
use crate::types::condition::ConditionSpec;
use crate::types::ApiKeySecret;

/// An alert policy aggregate. Owns a set of declared conditions, which the
/// reconciler materializes as AlertCondition resources.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "alertsync.dev", version = "v1", kind = "Policy")]
#[kube(namespaced)]
#[kube(status = "PolicyStatus")]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    pub name: String,
    #[serde(default)]
    pub incident_preference: IncidentPreference,
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_secret: Option<ApiKeySecret>,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "US".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default, JsonSchema)]
pub enum IncidentPreference {
    #[default]
    #[serde(rename = "PER_POLICY")]
    PerPolicy,
    #[serde(rename = "PER_CONDITION")]
    PerCondition,
    #[serde(rename = "PER_CONDITION_AND_TARGET")]
    PerConditionAndTarget,
}

impl IncidentPreference {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            IncidentPreference::PerPolicy => "PER_POLICY",
            IncidentPreference::PerCondition => "PER_CONDITION",
            IncidentPreference::PerConditionAndTarget => "PER_CONDITION_AND_TARGET",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatus {
    /// Remote policy identifier; 0 means no remote policy exists yet
    #[serde(default)]
    pub policy_id: i64,
    /// The last spec for which every remote mutation succeeded. Never
    /// partially updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_spec: Option<PolicySpec>,
}

impl PolicySpec {
    /// The remote API representation of this policy (conditions excluded;
    /// they are separate remote entities)
    pub fn api_policy(&self) -> AlertPolicy {
        AlertPolicy {
            id: 0,
            name: self.name.clone(),
            incident_preference: self.incident_preference.as_api_str().to_string(),
        }
    }
}

impl Policy {
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    pub fn policy_id(&self) -> i64 {
        self.status.as_ref().map_or(0, |s| s.policy_id)
    }

    pub fn applied_spec(&self) -> Option<&PolicySpec> {
        self.status.as_ref().and_then(|s| s.applied_spec.as_ref())
    }

    /// Spec matches the last successfully applied spec, so reconciliation
    /// can short-circuit without any remote calls
    pub fn is_converged(&self) -> bool {
        self.applied_spec() == Some(&self.spec)
    }
}
