use std::path::PathBuf;

use clap::Parser;

use crate::markdown::{ModulesSorting, PackagesSorting};

/// Compares the dependencies declared by multiple go.mod files.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    /// Paths to the go.mod files to compare
    #[clap(required = true)]
    pub mod_files: Vec<PathBuf>,
    /// Order of the module columns
    #[clap(
        long,
        value_enum,
        env = "MODVERSIONS_MODULES_SORTING",
        default_value_t = ModulesSorting::Alphabetically
    )]
    pub modules_sorting: ModulesSorting,
    /// Order of the package rows
    #[clap(
        long,
        value_enum,
        env = "MODVERSIONS_PACKAGES_SORTING",
        default_value_t = PackagesSorting::AlphabeticallySupported
    )]
    pub packages_sorting: PackagesSorting,
    /// Detect and display the license of each package [default]
    #[clap(long, overrides_with = "no_license")]
    pub show_license: bool,
    /// Do not detect nor display the license of each package
    #[clap(long, overrides_with = "show_license")]
    pub no_license: bool,
    /// Location of the Go module cache [default: $GOMODCACHE, $GOPATH/pkg/mod or $HOME/go/pkg/mod]
    #[clap(long, env = "MODVERSIONS_MOD_CACHE")]
    pub mod_cache: Option<PathBuf>,
}
