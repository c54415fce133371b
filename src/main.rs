mod catalog;
mod config;
mod error;
mod models;
mod pipeline;
mod poster;
mod providers;
mod record;
mod targets;
mod tmdb;

use std::time::Duration;

use tracing::info;

use crate::{
    catalog::Catalog,
    config::Config,
    poster::{HttpImageFetcher, PosterCache},
    tmdb::TmdbClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,cinefetch=debug".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .user_agent("cinefetch/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let tmdb = TmdbClient::new(
        http.clone(),
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    );
    let posters =
        PosterCache::new(config.posters_dir.clone(), config.tmdb_image_base_url.clone());
    let fetcher = HttpImageFetcher::new(http);

    let targets = targets::load(&config.targets_file)?;
    let mut catalog = Catalog::load(&config.movies_file)?;
    info!(targets = targets.len(), existing_records = catalog.len(), "starting run");

    let summary =
        pipeline::run(&tmdb, &posters, &fetcher, &config, &mut catalog, &targets).await;

    // The one fatal failure mode after setup: the catalog write.
    catalog.save(&config.movies_file)?;

    info!(
        added = summary.added,
        updated = summary.updated,
        not_found = summary.not_found,
        failed = summary.failed,
        records = catalog.len(),
        "catalog written"
    );

    Ok(())
}
