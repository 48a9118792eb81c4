use std::fmt::Display;

/// Licenses whose copyleft obligations stop at the file or library boundary.
const WEAK_COPYLEFT_PREFIXES: [&str; 5] = ["LGPL-", "MPL-", "EPL-", "CDDL-", "EUPL-"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LicenseCategory {
    Permissive,
    WeakCopyleft,
    Copyleft,
}

impl Display for LicenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseCategory::Permissive => f.write_str("permissive"),
            LicenseCategory::WeakCopyleft => f.write_str("weak-copyleft"),
            LicenseCategory::Copyleft => f.write_str("copyleft"),
        }
    }
}

/// License detected for a package. The default value means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct License {
    pub identifier: String,
    pub name: String,
    pub short_name: String,
    pub category: Option<LicenseCategory>,
}

impl License {
    /// Builds a license from an SPDX identifier, `None` when the identifier is
    /// not on the SPDX license list.
    pub fn from_spdx_identifier(identifier: &str) -> Option<License> {
        let id = spdx::license_id(identifier)?;

        let category = if WEAK_COPYLEFT_PREFIXES
            .iter()
            .any(|prefix| id.name.starts_with(prefix))
        {
            LicenseCategory::WeakCopyleft
        } else if id.is_copyleft() {
            LicenseCategory::Copyleft
        } else {
            LicenseCategory::Permissive
        };

        Some(License {
            identifier: id.name.to_string(),
            name: id.full_name.to_string(),
            short_name: short_name(id.name),
            category: Some(category),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.identifier.is_empty()
    }
}

/// `GPL-3.0-only` reads as `GPL-3.0`, `Apache-2.0` stays as is.
fn short_name(identifier: &str) -> String {
    identifier
        .strip_suffix("-only")
        .or_else(|| identifier.strip_suffix("-or-later"))
        .unwrap_or(identifier)
        .to_string()
}
