use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sig_types::{Modifier, Visibility};

use crate::error::{DeltaError, DeltaResult};

/// Configuration for the snapshot comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Declarations less visible than this are ignored on both sides.
    pub min_visibility: Visibility,
    /// When `true`, annotations are not compared.
    pub ignore_annotations: bool,
    /// Modifiers that are implementation details rather than API contract.
    pub ignored_modifiers: BTreeSet<Modifier>,
    /// Package name prefixes excluded from the comparison. A prefix matches
    /// the package itself and its subpackages.
    pub ignored_packages: Vec<String>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            min_visibility: Visibility::Protected,
            ignore_annotations: false,
            ignored_modifiers: [Modifier::Synchronized, Modifier::Native, Modifier::Strictfp]
                .into_iter()
                .collect(),
            ignored_packages: Vec::new(),
        }
    }
}

impl CompareConfig {
    /// Compare every declaration and every modifier.
    pub fn strict() -> Self {
        Self {
            min_visibility: Visibility::Private,
            ignore_annotations: false,
            ignored_modifiers: BTreeSet::new(),
            ignored_packages: Vec::new(),
        }
    }

    /// Parse from TOML. Missing keys take their default values.
    pub fn from_toml_str(s: &str) -> DeltaResult<Self> {
        toml::from_str(s).map_err(|e| DeltaError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> DeltaResult<String> {
        toml::to_string(self).map_err(|e| DeltaError::Config(e.to_string()))
    }

    pub fn is_package_ignored(&self, package: &str) -> bool {
        self.ignored_packages.iter().any(|prefix| {
            package == prefix
                || package
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    pub fn is_visible(&self, visibility: Visibility) -> bool {
        visibility >= self.min_visibility
    }
}
