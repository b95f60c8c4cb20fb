use serde::{Deserialize, Serialize};

use crate::names::NameComparison;

/// Filing capabilities and naming rules of one store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Documents may be filed in more than one folder.
    pub multifiling: bool,
    /// Documents may exist without any parent folder.
    pub unfiling: bool,
    pub name_comparison: NameComparison,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            multifiling: true,
            unfiling: true,
            name_comparison: NameComparison::Exact,
        }
    }
}

impl StoreConfig {
    /// Single-filing store: no multi-filing, no unfiled documents.
    pub fn single_filing() -> Self {
        Self {
            multifiling: false,
            unfiling: false,
            ..Self::default()
        }
    }

    /// Use `comparison` for sibling-name checks.
    pub fn with_name_comparison(mut self, comparison: NameComparison) -> Self {
        self.name_comparison = comparison;
        self
    }
}
