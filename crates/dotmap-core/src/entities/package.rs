use serde::{Deserialize, Serialize};

/// An external versioned dependency. Identity is `(name, version)` within a scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Package {
    pub name: String,
    /// Declared version, or `"N/A"` when the reference carries none.
    pub version: String,
}

impl Package {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}
