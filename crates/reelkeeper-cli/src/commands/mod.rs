use color_eyre::eyre::eyre;
use color_eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use movie_track_config::{Config, PathManager};
use std::io::IsTerminal;

pub mod browse;
pub mod config;
pub mod search;
pub mod title;
pub mod watched;

/// Load and validate the config, with a pointer to `config init` when it
/// is missing or incomplete.
pub(crate) fn load_config(paths: &PathManager) -> Result<Config> {
    let config_file = paths.config_file();
    let config = Config::load_from_file(&config_file).map_err(|e| {
        eyre!(
            "could not read {} ({}); run 'reelkeeper config init' first",
            config_file.display(),
            e
        )
    })?;
    config.validate().map_err(|e| eyre!("{}", e))?;
    Ok(config)
}

/// Spinner shown while a fetch is in flight. Hidden when stderr is not a
/// terminal so piped output stays clean.
pub(crate) fn loading_spinner(message: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}
