use crate::commands::{load_config, loading_spinner};
use crate::output::{Output, OutputFormat};
use movie_track_config::PathManager;
use movie_track_core::Session;
use movie_track_models::MovieDetail;
use serde_json::json;

pub async fn run(out: &Output, paths: &PathManager, imdb_id: &str) -> color_eyre::Result<()> {
    let config = load_config(paths)?;
    let mut session = Session::from_config(&config, paths)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let spinner = loading_spinner("Fetching title...");
    session.select(imdb_id);
    session.settle().await;
    spinner.finish_and_clear();

    let state = session.detail_state();
    if let Some(error) = state.error {
        out.error(&error);
        return Ok(());
    }
    let Some(detail) = state.detail else {
        return Ok(());
    };

    match out.format() {
        OutputFormat::Human => {
            render_detail(out, &detail);
            if let Some(stored) = session.watched_rating() {
                out.info(format!("You already rated this movie {stored} ★"));
            }
        }
        _ => out.json(&json!({
            "detail": detail,
            "user_rating": session.watched_rating(),
        })),
    }

    Ok(())
}

fn render_detail(out: &Output, detail: &MovieDetail) {
    out.info(format!("{} ({})", detail.title, detail.year));
    out.info(format!(
        "{} • {} min • {} ★",
        detail.released, detail.runtime_minutes, detail.imdb_rating
    ));
    out.info(format!("Genre: {}", detail.genre));
    if !detail.plot.is_empty() {
        out.info(format!("\n{}\n", detail.plot));
    }
    out.info(format!("Starring {}", detail.actors));
    out.info(format!("Directed by {}", detail.director));
}
