use std::{error::Error, path::PathBuf};

use crate::{
    config::VersionsConfig,
    markdown::{ModulesSorting, PackagesSorting},
    ModVersions,
};

#[derive(Default)]
pub struct ModVersionsBuilder {
    mod_files: Vec<PathBuf>,
    mod_cache_directory: Option<PathBuf>,
    modules_sorting: Option<ModulesSorting>,
    packages_sorting: Option<PackagesSorting>,
    show_license: Option<bool>,
}

impl ModVersionsBuilder {
    /// Adds a go.mod file to compare. Files are compared in the order they
    /// are added.
    pub fn mod_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.mod_files.push(path.into());
        self
    }

    pub fn mod_files<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.mod_files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Location of the Go module cache used to detect licenses.
    ///
    /// Defaults to `$GOMODCACHE`, then `$GOPATH/pkg/mod`, then `$HOME/go/pkg/mod`.
    pub fn mod_cache_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.mod_cache_directory = Some(path.into());
        self
    }

    /// Defaults to alphabetically.
    pub fn modules_sorting(mut self, sorting: ModulesSorting) -> Self {
        self.modules_sorting = Some(sorting);
        self
    }

    /// Defaults to alphabetically, packages used the same way by all modules first.
    pub fn packages_sorting(mut self, sorting: PackagesSorting) -> Self {
        self.packages_sorting = Some(sorting);
        self
    }

    /// Defaults to true.
    pub fn show_license(mut self, show_license: bool) -> Self {
        self.show_license = Some(show_license);
        self
    }

    pub fn try_build(self) -> Result<ModVersions, Box<dyn Error>> {
        let Self {
            mod_files,
            mod_cache_directory,
            modules_sorting,
            packages_sorting,
            show_license,
        } = self;

        if mod_files.is_empty() {
            return Err("path to go.mod files required".into());
        }

        let mod_cache = match mod_cache_directory {
            Some(mod_cache) => mod_cache,
            None => VersionsConfig::load()?.mod_cache_directory(),
        };

        Ok(ModVersions {
            mod_files,
            mod_cache,
            modules_sorting: modules_sorting.unwrap_or(ModulesSorting::Alphabetically),
            packages_sorting: packages_sorting
                .unwrap_or(PackagesSorting::AlphabeticallySupported),
            show_license: show_license.unwrap_or(true),
        })
    }
}
