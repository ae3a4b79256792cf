use crate::commands::{load_config, loading_spinner};
use crate::output::{Output, OutputFormat};
use comfy_table::{Cell, Table};
use movie_track_config::PathManager;
use movie_track_core::Session;
use movie_track_models::SearchResult;
use serde_json::json;

pub async fn run(out: &Output, paths: &PathManager, query: &str) -> color_eyre::Result<()> {
    let config = load_config(paths)?;
    let mut session = Session::from_config(&config, paths)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let spinner = loading_spinner("Searching...");
    session.set_query(query);
    session.settle().await;
    spinner.finish_and_clear();

    let state = session.search_state();
    if let Some(error) = state.error {
        out.error(&error);
        return Ok(());
    }
    if state.results.is_empty() {
        out.warn(format!(
            "Query is shorter than {} characters; nothing was searched",
            config.search.min_query_length
        ));
        return Ok(());
    }

    match out.format() {
        OutputFormat::Human => {
            out.info(format!("Found {} results", state.results.len()));
            render_table(&state.results);
        }
        _ => out.json(&json!({
            "query": query,
            "results": state.results,
        })),
    }

    Ok(())
}

fn render_table(results: &[SearchResult]) {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("IMDb ID").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for movie in results {
        table.add_row(vec![
            Cell::new(&movie.imdb_id),
            Cell::new(&movie.title),
            Cell::new(&movie.year),
        ]);
    }
    println!("{table}");
}
