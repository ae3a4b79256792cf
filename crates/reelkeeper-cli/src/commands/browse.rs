use crate::commands::{load_config, loading_spinner};
use crate::output::Output;
use movie_track_config::PathManager;
use movie_track_core::{Keymap, Session};
use movie_track_models::MovieDetail;
use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

/// Interactive session: search, pick a title, view details, rate, add.
///
/// Input events go through the [`Keymap`] rather than straight into the
/// session, so "back" behaves the same whether it comes from the Escape
/// menu entry or any future input surface.
pub async fn run(out: &Output, paths: &PathManager) -> color_eyre::Result<()> {
    let config = load_config(paths)?;
    let mut session = Session::from_config(&config, paths)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let keymap = Keymap::new();
    let escape_pressed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&escape_pressed);
    let _escape = keymap.bind("escape", move || flag.set(true));

    loop {
        let query: String = dialoguer::Input::new()
            .with_prompt("Search movies (empty to quit)")
            .allow_empty(true)
            .interact_text()?;
        if query.trim().is_empty() {
            break;
        }

        let spinner = loading_spinner("Searching...");
        session.set_query(&query);
        session.settle().await;
        spinner.finish_and_clear();

        let state = session.search_state();
        if let Some(error) = state.error {
            out.error(&error);
            continue;
        }
        if state.results.is_empty() {
            out.warn(format!(
                "Keep typing - queries need at least {} characters",
                config.search.min_query_length
            ));
            continue;
        }

        let mut items: Vec<String> = state
            .results
            .iter()
            .map(|movie| format!("{} ({})", movie.title, movie.year))
            .collect();
        items.push("← Back (Esc)".to_string());
        let choice = dialoguer::Select::new()
            .with_prompt("Select a title")
            .items(&items)
            .default(0)
            .interact()?;
        if choice == state.results.len() {
            keymap.dispatch("escape");
            apply_escape(&escape_pressed, &mut session);
            continue;
        }

        session.select(&state.results[choice].imdb_id);
        let spinner = loading_spinner("Fetching details...");
        session.settle().await;
        spinner.finish_and_clear();

        let detail_state = session.detail_state();
        if let Some(error) = detail_state.error {
            out.error(&error);
            session.close_detail();
            continue;
        }
        let Some(detail) = detail_state.detail else {
            continue;
        };
        render_detail(out, &detail);

        if let Some(stored) = session.watched_rating() {
            out.info(format!("You already rated this movie {stored} ★"));
            keymap.dispatch("escape");
            apply_escape(&escape_pressed, &mut session);
            continue;
        }

        rate_and_add(out, &mut session, &keymap, &escape_pressed)?;
    }

    session.shutdown();
    Ok(())
}

fn rate_and_add(
    out: &Output,
    session: &mut Session,
    keymap: &Keymap,
    escape_pressed: &Rc<Cell<bool>>,
) -> color_eyre::Result<()> {
    loop {
        let raw: String = dialoguer::Input::new()
            .with_prompt(format!("Your rating 1-{} (empty to skip)", session.max_rating()))
            .allow_empty(true)
            .interact_text()?;
        if raw.trim().is_empty() {
            keymap.dispatch("escape");
            apply_escape(escape_pressed, session);
            return Ok(());
        }

        let value: u8 = match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                out.warn("Ratings are whole numbers");
                continue;
            }
        };
        if let Err(err) = session.rate(value) {
            out.warn(err.to_string());
            continue;
        }

        let add = dialoguer::Confirm::new()
            .with_prompt("Add to watched list?")
            .default(true)
            .interact()?;
        if !add {
            // Loop back so the rating can be revised before committing.
            continue;
        }

        match session.add_to_watched() {
            Ok(entry) => out.success(format!("Added {} ({} ★)", entry.title, entry.user_rating)),
            Err(err) => out.error(err.to_string()),
        }
        return Ok(());
    }
}

fn apply_escape(escape_pressed: &Rc<Cell<bool>>, session: &mut Session) {
    if escape_pressed.take() {
        debug!("escape pressed, closing detail pane");
        session.close_detail();
    }
}

fn render_detail(out: &Output, detail: &MovieDetail) {
    out.info(format!("\n{} ({})", detail.title, detail.year));
    out.info(format!(
        "{} • {} min • {} ★ • {}",
        detail.released, detail.runtime_minutes, detail.imdb_rating, detail.genre
    ));
    if !detail.plot.is_empty() {
        out.info(format!("\n{}\n", detail.plot));
    }
    out.info(format!("Starring {}", detail.actors));
    out.info(format!("Directed by {}\n", detail.director));
}
