use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use comfy_table::{Cell, Table};
use movie_track_config::{Config, PathManager};
use serde_json::json;

pub fn run(out: &Output, paths: &PathManager, cmd: ConfigCommands) -> color_eyre::Result<()> {
    match cmd {
        ConfigCommands::Show => show(out, paths),
        ConfigCommands::Init => init(out, paths),
    }
}

fn show(out: &Output, paths: &PathManager) -> color_eyre::Result<()> {
    let config_file = paths.config_file();
    let config = Config::load_from_file(&config_file).unwrap_or_default();

    if let OutputFormat::Json | OutputFormat::JsonPretty = out.format() {
        out.json(&json!({
            "config_file": config_file.display().to_string(),
            "api_key": mask_key(&config.api.api_key),
            "base_url": config.api.base_url,
            "min_query_length": config.search.min_query_length,
            "max_rating": config.search.max_rating,
            "configured": config.is_api_configured(),
        }));
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Config File"),
        Cell::new(config_file.display().to_string()),
    ]);
    table.add_row(vec![Cell::new("API Key"), Cell::new(mask_key(&config.api.api_key))]);
    table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.api.base_url)]);
    table.add_row(vec![
        Cell::new("Min Query Length"),
        Cell::new(config.search.min_query_length),
    ]);
    table.add_row(vec![Cell::new("Max Rating"), Cell::new(config.search.max_rating)]);
    println!("{table}");

    if !config.is_api_configured() {
        out.warn("API key is not configured; run 'reelkeeper config init'");
    }

    Ok(())
}

fn init(out: &Output, paths: &PathManager) -> color_eyre::Result<()> {
    let mut config = Config::load_from_file(&paths.config_file()).unwrap_or_default();

    let api_key: String = dialoguer::Input::new()
        .with_prompt("OMDb API key")
        .with_initial_text(config.api.api_key.clone())
        .interact_text()?;
    config.api.api_key = api_key.trim().to_string();
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    paths
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    config
        .save_to_file(&paths.config_file())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    out.success(format!("Configuration saved to {}", paths.config_file().display()));

    Ok(())
}

fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let visible: String = key.chars().take(2).collect();
    format!("{visible}******")
}
