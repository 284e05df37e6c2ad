// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Prints the CustomResourceDefinitions for all managed kinds as a
//! multi-document YAML stream, ready for `kubectl apply -f -`.

use anyhow::Result;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::CustomResourceExt;

use alertsync::types::channel::AlertsChannel;
use alertsync::types::condition::AlertCondition;
use alertsync::types::policy::Policy;

fn main() -> Result<()> {
    for crd in [Policy::crd(), AlertCondition::crd(), AlertsChannel::crd()] {
        println!("---");
        print!("{}", serde_yaml::to_string(&strip_status_subresource(crd))?);
    }
    Ok(())
}

/// Status is persisted with a whole-object replace, so the generated
/// status subresource is dropped from the served versions.
fn strip_status_subresource(mut crd: CustomResourceDefinition) -> CustomResourceDefinition {
    for version in &mut crd.spec.versions {
        version.subresources = None;
    }
    crd
}
