use log::{debug, info};

use crate::{
    license::{DirectoryLicenseResolver, NoLicenseResolver},
    markdown::{Markdown, ModulesSorting, PackagesSorting},
    versions::Versions,
};
use std::{
    error::Error,
    path::{Path, PathBuf},
};

/// Handler to compare go.mod files
/// Parses every file in the given order and aggregates them.
/// Licenses are only detected when they are going to be displayed.
pub fn do_compare(
    mod_files: &[PathBuf],
    mod_cache: &Path,
    show_license: bool,
) -> Result<Versions, Box<dyn Error>> {
    info!("Comparing {} go.mod files", mod_files.len());

    let versions = if show_license {
        debug!("Detecting licenses in {}", mod_cache.display());
        Versions::from_files(mod_files, mod_cache, &DirectoryLicenseResolver)?
    } else {
        Versions::from_files(mod_files, mod_cache, &NoLicenseResolver)?
    };

    Ok(versions)
}

/// Handler to render the comparison as Markdown
pub fn do_render(
    versions: &Versions,
    modules_sorting: ModulesSorting,
    packages_sorting: PackagesSorting,
    show_license: bool,
) -> String {
    Markdown::new(versions)
        .modules_sorting(modules_sorting)
        .packages_sorting(packages_sorting)
        .show_license(show_license)
        .to_string()
}
