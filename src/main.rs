use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use md2zim::storage::default_output_path;
use md2zim::{read_document, write_document, Converter, Result};

mod cli;
use cli::Cli;

fn start_dir_for(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf()
}

fn run(cli: &Cli) -> Result<()> {
    let (config, config_path) =
        md2zim::config::load(cli.config.as_deref(), &start_dir_for(&cli.file))?;

    if let Some(path) = &config_path {
        log::debug!("Using config from: {}", path.display());
    } else {
        log::debug!("Using default config");
    }

    let output = cli
        .out
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.file, &config.output_suffix));

    log::info!("Reading {}", cli.file.display());
    let markdown = read_document(&cli.file)?;

    let mut converter = Converter::new(config)?;
    let zim = converter.convert(&markdown);

    let written = write_document(&output, &zim, !cli.no_overwrite)?;
    log::info!("Wrote {}", written.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
