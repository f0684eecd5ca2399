//! Version graph policy configuration.

use serde::{Deserialize, Serialize};

/// Policy applied when a lineage root project is deleted while non-root
/// versions still exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootDeletePolicy {
    /// Delete the entire lineage (root plus every derived version).
    Cascade,
    /// Refuse the deletion with a conflict error until the derived
    /// versions have been deleted first.
    Refuse,
}

/// Version graph settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersioningConfig {
    /// What happens when a lineage root is deleted while branches remain.
    #[serde(default = "default_root_delete_policy")]
    pub root_delete_policy: RootDeletePolicy,
    /// Version name given to newly created lineage roots.
    #[serde(default = "default_initial_version_name")]
    pub initial_version_name: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            root_delete_policy: default_root_delete_policy(),
            initial_version_name: default_initial_version_name(),
        }
    }
}

fn default_root_delete_policy() -> RootDeletePolicy {
    RootDeletePolicy::Cascade
}

fn default_initial_version_name() -> String {
    "v1".to_string()
}
