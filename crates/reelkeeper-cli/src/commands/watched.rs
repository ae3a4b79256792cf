use crate::output::{Output, OutputFormat};
use crate::WatchedCommands;
use comfy_table::{Cell, Table};
use movie_track_config::PathManager;
use movie_track_core::{FileStore, WatchedList};
use movie_track_models::WatchedEntry;
use serde_json::json;

pub fn run(out: &Output, paths: &PathManager, cmd: WatchedCommands) -> color_eyre::Result<()> {
    let store = FileStore::new(paths.data_dir()).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    let mut watched = WatchedList::open(Box::new(store));

    match cmd {
        WatchedCommands::List => list(out, &watched),
        WatchedCommands::Remove { imdb_id } => {
            if !watched.contains(&imdb_id) {
                out.warn(format!("{imdb_id} is not on the watched list"));
                return Ok(());
            }
            watched.remove(&imdb_id);
            out.success(format!("Removed {imdb_id}"));
        }
    }

    Ok(())
}

fn list(out: &Output, watched: &WatchedList) {
    if let OutputFormat::Json | OutputFormat::JsonPretty = out.format() {
        out.json(&json!({
            "count": watched.len(),
            "average_imdb_rating": watched.average_imdb_rating(),
            "average_user_rating": watched.average_user_rating(),
            "average_runtime_minutes": watched.average_runtime_minutes(),
            "entries": watched.entries(),
        }));
        return;
    }

    if watched.is_empty() {
        out.info("No watched movies yet. Try 'reelkeeper browse'.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("IMDb ID").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("IMDb ★").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Your ★").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Runtime").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for entry in watched.entries() {
        table.add_row(watched_row(entry));
    }
    println!("{table}");

    out.info(format!(
        "{} movies • avg IMDb {:.1} • avg yours {:.1} • avg {:.0} min",
        watched.len(),
        watched.average_imdb_rating(),
        watched.average_user_rating(),
        watched.average_runtime_minutes(),
    ));
}

fn watched_row(entry: &WatchedEntry) -> Vec<Cell> {
    vec![
        Cell::new(&entry.imdb_id),
        Cell::new(&entry.title),
        Cell::new(&entry.year),
        Cell::new(format!("{:.1}", entry.imdb_rating)),
        Cell::new(entry.user_rating),
        Cell::new(format!("{} min", entry.runtime_minutes)),
    ]
}
