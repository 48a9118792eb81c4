//! Renders `Versions` as a basic flavored Markdown table, supported by
//! GitHub and GitLab.

use std::fmt::{Display, Write};

use clap::ValueEnum;

use crate::versions::Versions;

mod header;
mod packages;

use header::Header;
use packages::PackageRows;

const SAME_MARKER: &str = ":white_check_mark: ";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModulesSorting {
    /// Modules are rendered in the order they were parsed.
    #[default]
    AsInput,
    /// Modules are rendered alphabetically by name.
    Alphabetically,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackagesSorting {
    /// Packages are rendered in the order they were found.
    #[default]
    AsFound,
    /// Packages are sorted alphabetically in two groups: first the packages
    /// every module requires the same way, then the rest.
    AlphabeticallySupported,
    /// Packages are sorted alphabetically by name.
    Alphabetically,
}

pub struct Markdown<'a> {
    versions: &'a Versions,
    modules_sorting: ModulesSorting,
    packages_sorting: PackagesSorting,
    show_license: bool,
}

impl<'a> Markdown<'a> {
    pub fn new(versions: &'a Versions) -> Self {
        Markdown {
            versions,
            modules_sorting: ModulesSorting::default(),
            packages_sorting: PackagesSorting::default(),
            show_license: false,
        }
    }

    pub fn modules_sorting(mut self, sorting: ModulesSorting) -> Self {
        self.modules_sorting = sorting;
        self
    }

    pub fn packages_sorting(mut self, sorting: PackagesSorting) -> Self {
        self.packages_sorting = sorting;
        self
    }

    /// Appends the detected license, when known, to every version cell.
    pub fn show_license(mut self, show_license: bool) -> Self {
        self.show_license = show_license;
        self
    }
}

impl Display for Markdown<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = Header::new(
            self.modules_sorting,
            self.versions.go_versions.is_same(),
            self.versions.modules(),
        );
        let packages = PackageRows::new(
            self.versions,
            header.modules(),
            self.packages_sorting,
            self.show_license,
        );

        write_row(f, &header.names())?;
        write_separator(f, header.modules().len())?;
        write_row(f, &header.go_versions())?;
        for row in packages.values() {
            write_row(f, &row)?;
        }

        Ok(())
    }
}

fn write_row(f: &mut std::fmt::Formatter<'_>, cells: &[String]) -> std::fmt::Result {
    f.write_char('|')?;
    for cell in cells {
        if cell.is_empty() {
            f.write_str(" |")?;
        } else {
            write!(f, " {cell} |")?;
        }
    }
    f.write_char('\n')
}

fn write_separator(f: &mut std::fmt::Formatter<'_>, columns: usize) -> std::fmt::Result {
    f.write_str("|---|")?;
    for _ in 0..columns {
        f.write_str(":---:|")?;
    }
    f.write_char('\n')
}
