use crate::versions::Module;

use super::{ModulesSorting, SAME_MARKER};

/// Module columns of the table together with their Go versions.
pub(super) struct Header<'a> {
    same: bool,
    modules: Vec<&'a Module>,
}

impl<'a> Header<'a> {
    pub(super) fn new(sorting: ModulesSorting, same: bool, modules: &'a [Module]) -> Self {
        let mut modules = modules.iter().collect::<Vec<_>>();

        if sorting == ModulesSorting::Alphabetically {
            modules.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Header { same, modules }
    }

    pub(super) fn modules(&self) -> &[&'a Module] {
        &self.modules
    }

    pub(super) fn names(&self) -> Vec<String> {
        std::iter::once(String::new())
            .chain(self.modules.iter().map(|module| module.name.to_string()))
            .collect()
    }

    pub(super) fn go_versions(&self) -> Vec<String> {
        let label = if self.same {
            format!("{SAME_MARKER}Go")
        } else {
            "Go".to_string()
        };

        std::iter::once(label)
            .chain(
                self.modules
                    .iter()
                    .map(|module| module.go_version.to_string()),
            )
            .collect()
    }
}
