use std::{error::Error, path::PathBuf};

use crate::{
    cli::command_handlers::{do_compare, do_render},
    markdown::{ModulesSorting, PackagesSorting},
    versions::Versions,
};

mod builder;

pub use builder::ModVersionsBuilder;

pub struct ModVersions {
    mod_files: Vec<PathBuf>,
    mod_cache: PathBuf,
    modules_sorting: ModulesSorting,
    packages_sorting: PackagesSorting,
    show_license: bool,
}

impl ModVersions {
    pub fn builder() -> ModVersionsBuilder {
        ModVersionsBuilder::default()
    }

    /// Parses and aggregates the go.mod files
    pub fn versions(&self) -> Result<Versions, Box<dyn Error>> {
        do_compare(&self.mod_files, &self.mod_cache, self.show_license)
    }

    /// Renders the comparison of the go.mod files as Markdown
    pub fn markdown(&self) -> Result<String, Box<dyn Error>> {
        let versions = self.versions()?;
        Ok(do_render(
            &versions,
            self.modules_sorting,
            self.packages_sorting,
            self.show_license,
        ))
    }
}
