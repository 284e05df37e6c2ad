// Copyright 2026, Alertsync Authors
// SPDX-License-Identifier: Apache-2.0

//! API-key resolution from an inline value or a referenced Secret.

use tracing::warn;

use crate::constants::api::PARTIAL_KEY_LEN;
use crate::store::Store;
use crate::types::ApiKeySecret;

/// Resolve the alerts API key for a resource. An inline key wins; otherwise
/// the referenced secret is fetched and its named data field extracted. Any
/// failure logs and yields an empty string, which callers treat as fatal
/// for the current invocation. Keys are resolved on every reconciliation,
/// never cached.
pub async fn resolve_api_key(
    store: &dyn Store,
    api_key: &str,
    api_key_secret: Option<&ApiKeySecret>,
) -> String {
    if !api_key.is_empty() {
        return api_key.to_string();
    }

    let Some(secret_ref) = api_key_secret else {
        return String::new();
    };

    let secret = match store.get_secret(&secret_ref.namespace, &secret_ref.name).await {
        Ok(Some(secret)) => secret,
        Ok(None) => {
            warn!(
                "API key secret {}/{} not found",
                secret_ref.namespace, secret_ref.name
            );
            return String::new();
        }
        Err(e) => {
            warn!(
                "Failed to retrieve API key secret {}/{}: {}",
                secret_ref.namespace, secret_ref.name, e
            );
            return String::new();
        }
    };

    match secret
        .data
        .as_ref()
        .and_then(|d| d.get(&secret_ref.key_name))
    {
        Some(bytes) => String::from_utf8_lossy(&bytes.0).into_owned(),
        None => {
            warn!(
                "API key secret {}/{} has no '{}' field",
                secret_ref.namespace, secret_ref.name, secret_ref.key_name
            );
            String::new()
        }
    }
}

/// Redacted form of an API key safe for log fields
pub fn partial_api_key(api_key: &str) -> String {
    let prefix: String = api_key.chars().take(PARTIAL_KEY_LEN).collect();
    if prefix.len() == api_key.len() {
        prefix
    } else {
        format!("{}...", prefix)
    }
}
