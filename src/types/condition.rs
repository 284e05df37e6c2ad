// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::alerts::{AlertConditionTerm, AlertNrqlCondition, Nrql};
use crate::types::ApiKeySecret;

/// An NRQL-style alert condition. Conditions are declared embedded in a
/// Policy spec; the policy reconciler materializes each one as its own
/// AlertCondition resource with a content-addressed name, and this type's
/// controller owns the remote lifecycle.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[kube(group = "alertsync.dev", version = "v1", kind = "AlertCondition")]
#[kube(namespaced)]
#[kube(status = "ConditionStatus")]
#[serde(rename_all = "camelCase")]
pub struct ConditionSpec {
    /// User-supplied logical name; the stable identity key for child
    /// matching within a policy
    pub name: String,
    pub query: String,
    #[serde(default)]
    pub terms: Vec<ConditionTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runbook_url: Option<String>,
    #[serde(default)]
    pub enabled: bool,

    // Denormalized from the parent policy when the resource is generated
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_secret: Option<ApiKeySecret>,
    /// Remote identifier of the parent policy the condition attaches to
    #[serde(default)]
    pub existing_policy_id: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionTerm {
    pub duration: String,
    pub operator: String,
    pub priority: String,
    pub threshold: String,
    pub time_function: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionStatus {
    #[serde(default)]
    pub condition_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_spec: Option<ConditionSpec>,
}

impl ConditionSpec {
    /// The remote API representation of this condition
    pub fn api_condition(&self) -> AlertNrqlCondition {
        AlertNrqlCondition {
            id: 0,
            name: self.name.clone(),
            runbook_url: self.runbook_url.clone(),
            enabled: self.enabled,
            terms: self
                .terms
                .iter()
                .map(|t| AlertConditionTerm {
                    duration: t.duration.clone(),
                    operator: t.operator.clone(),
                    priority: t.priority.clone(),
                    threshold: t.threshold.clone(),
                    time_function: t.time_function.clone(),
                })
                .collect(),
            nrql: Nrql {
                query: self.query.clone(),
            },
        }
    }
}

impl AlertCondition {
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    pub fn condition_id(&self) -> i64 {
        self.status.as_ref().map_or(0, |s| s.condition_id)
    }

    pub fn applied_spec(&self) -> Option<&ConditionSpec> {
        self.status.as_ref().and_then(|s| s.applied_spec.as_ref())
    }

    /// Spec matches the last successfully applied spec, so there is no
    /// drift to correct
    pub fn is_converged(&self) -> bool {
        self.applied_spec() == Some(&self.spec)
    }
}
