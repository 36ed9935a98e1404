//! api::apps
//!
//! Apps-list normalization.
//!
//! Three historical shapes exist for the persisted `apps` entry:
//!
//! 1. A bare array of canonical [`App`] descriptors (current)
//! 2. A `{"data": [...]}` wrapper around the same descriptors
//! 3. An array of legacy locally-entered `{appId, appKey, apiUrl}` entries
//!
//! Rather than shape-sniffing at every read site, loading migrates everything
//! to shape 1 and reports whether a rewrite is needed; the session manager
//! rewrites the key canonically after a migrating load.

use serde::Deserialize;

use super::types::{App, LegacyApp};
use crate::session::SessionError;

/// Any of the historical persisted/wire shapes for an apps list.
#[derive(Deserialize)]
#[serde(untagged)]
enum AppsPayload {
    Canonical(Vec<App>),
    Wrapped { data: Vec<App> },
    Legacy(Vec<LegacyApp>),
}

/// Parse an apps list from any historical shape.
///
/// Returns the canonical list and whether the input needed migration (i.e.
/// was not already shape 1).
pub fn normalize_apps_json(json: &str) -> Result<(Vec<App>, bool), SessionError> {
    // The canonical shape must win when both match; untagged tries variants
    // in declaration order, so a bare canonical array never falls through to
    // the legacy branch (legacy entries lack `name` and fail the App shape).
    match serde_json::from_str::<AppsPayload>(json)? {
        AppsPayload::Canonical(apps) => Ok((apps, false)),
        AppsPayload::Wrapped { data } => Ok((data, true)),
        AppsPayload::Legacy(legacy) => {
            Ok((legacy.into_iter().map(App::from).collect(), true))
        }
    }
}

/// Serialize an apps list in the canonical shape.
pub fn canonical_apps_json(apps: &[App]) -> Result<String, SessionError> {
    Ok(serde_json::to_string(apps)?)
}
