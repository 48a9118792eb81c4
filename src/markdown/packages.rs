use crate::{
    model::PackageName,
    versions::{Module, Package, Versions},
};

use super::{PackagesSorting, SAME_MARKER};

/// One table row: a package and how each module column requires it.
#[derive(Debug)]
pub(super) struct PackageRow<'a> {
    name: &'a PackageName,
    same: bool,
    show_license: bool,
    packages: Vec<Option<&'a Package>>,
}

impl PackageRow<'_> {
    fn values(&self) -> Vec<String> {
        let name = if self.same {
            format!("{SAME_MARKER}{}", self.name)
        } else {
            self.name.to_string()
        };

        std::iter::once(name)
            .chain(self.packages.iter().map(|package| match package {
                Some(package) => cell(package, self.show_license),
                None => String::new(),
            }))
            .collect()
    }
}

fn cell(package: &Package, show_license: bool) -> String {
    let mut cell = package.effective_version().to_string();

    if package.indirect {
        cell.push_str(" :question:");
    }

    if package.is_replaced() {
        cell.push_str(" :exclamation:");
        match (
            package.replaced_path.is_empty(),
            package.replaced_version.is_empty(),
        ) {
            (false, false) => {
                cell.push_str(&format!(
                    " {}@{}",
                    package.replaced_path, package.replaced_version
                ));
            }
            (false, true) => {
                cell.push(' ');
                cell.push_str(&package.replaced_path);
            }
            (true, false) => {
                cell.push(' ');
                cell.push_str(&package.replaced_version);
            }
            (true, true) => {}
        }
    }

    if show_license && !package.license.is_empty() {
        cell.push_str("<br>");
        if let Some(category) = package.license.category {
            cell.push_str(&format!("{category} "));
        }
        cell.push_str(&package.license.name);
    }

    cell
}

/// Package rows split in two groups; the first group is rendered first.
pub(super) struct PackageRows<'a> {
    same: Vec<PackageRow<'a>>,
    different: Vec<PackageRow<'a>>,
}

impl<'a> PackageRows<'a> {
    pub(super) fn new(
        versions: &'a Versions,
        modules: &[&'a Module],
        sorting: PackagesSorting,
        show_license: bool,
    ) -> Self {
        let mut rows = PackageRows {
            same: vec![],
            different: vec![],
        };

        for name in versions.packages.names() {
            let row = PackageRow {
                name,
                same: versions.packages.is_same(name),
                show_license,
                packages: modules
                    .iter()
                    .map(|module| module.requirement(name))
                    .collect(),
            };

            if sorting == PackagesSorting::AlphabeticallySupported && !row.same {
                rows.different.push(row);
            } else {
                rows.same.push(row);
            }
        }

        if sorting != PackagesSorting::AsFound {
            rows.same.sort_by(|a, b| a.name.cmp(b.name));
            rows.different.sort_by(|a, b| a.name.cmp(b.name));
        }

        rows
    }

    pub(super) fn values(&self) -> Vec<Vec<String>> {
        self.same
            .iter()
            .chain(self.different.iter())
            .map(PackageRow::values)
            .collect()
    }
}
