// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! Content-addressed naming for generated condition resources.
//!
//! A condition resource's name is derived from its parent policy's name plus
//! a 32-bit FNV-1a hash of the condition spec content. Identical content
//! always yields the same name, so a changed condition is a new resource
//! rather than an in-place mutation of the old one.

use crate::error::Result;
use crate::types::condition::ConditionSpec;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit FNV-1a over a byte slice
fn fnv1a32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, b| {
        (hash ^ u32::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Hash a condition spec's content. Serialization goes through serde_json,
/// which emits struct fields in declaration order, so the digest is stable
/// for equal values.
pub fn condition_spec_hash(spec: &ConditionSpec) -> Result<u32> {
    Ok(fnv1a32(&serde_json::to_vec(spec)?))
}

/// Derive the generated resource name for a condition declared under the
/// given parent policy name.
pub fn condition_resource_name(parent: &str, spec: &ConditionSpec) -> Result<String> {
    Ok(format!("{}{}", parent, condition_spec_hash(spec)?))
}
