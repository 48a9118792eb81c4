use std::error::Error;

use clap::Parser;
use modversions::{cli::args::CliArgs, ModVersions};

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args = CliArgs::parse();
    log::debug!("Arguments: {:?}", cli_args);

    let mut builder = ModVersions::builder()
        .mod_files(cli_args.mod_files)
        .modules_sorting(cli_args.modules_sorting)
        .packages_sorting(cli_args.packages_sorting)
        .show_license(!cli_args.no_license);

    if let Some(mod_cache) = cli_args.mod_cache {
        builder = builder.mod_cache_directory(mod_cache);
    }

    let markdown = builder.try_build()?.markdown()?;
    println!("{markdown}");

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
