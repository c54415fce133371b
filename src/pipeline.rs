use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    catalog::{Catalog, Reconciliation},
    config::Config,
    error::AppResult,
    models::TargetSpec,
    poster::{ImageFetcher, PosterCache},
    providers,
    record::{self, slugify},
    tmdb::{MovieDetails, ProviderRegions, TmdbClient},
};

/// The metadata operations the pipeline consumes, kept behind a trait
/// so a worker-pool scheduler or a test stub can stand in for the live
/// TMDB client without touching reconciliation.
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn search_movie(&self, title: &str, year: Option<i32>) -> AppResult<Option<u64>>;
    async fn movie_details(&self, tmdb_id: u64) -> AppResult<MovieDetails>;
    async fn watch_providers(&self, tmdb_id: u64) -> AppResult<ProviderRegions>;
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn search_movie(&self, title: &str, year: Option<i32>) -> AppResult<Option<u64>> {
        TmdbClient::search_movie(self, title, year).await
    }

    async fn movie_details(&self, tmdb_id: u64) -> AppResult<MovieDetails> {
        TmdbClient::movie_details(self, tmdb_id).await
    }

    async fn watch_providers(&self, tmdb_id: u64) -> AppResult<ProviderRegions> {
        TmdbClient::watch_providers(self, tmdb_id).await
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    pub added: usize,
    pub updated: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Process every target in order, accumulating into the in-memory
/// catalog. Targets run sequentially to stay inside the metadata
/// service's rate limits; every per-target failure downgrades to a
/// skip so one bad title never aborts the run.
pub async fn run<S: MovieSource, F: ImageFetcher>(
    source: &S,
    posters: &PosterCache,
    fetcher: &F,
    config: &Config,
    catalog: &mut Catalog,
    targets: &[TargetSpec],
) -> RunSummary {
    let mut summary = RunSummary::default();

    for target in targets {
        info!(name = %target.name, year = ?target.year, category = %target.category, "processing");

        let tmdb_id = match source.search_movie(&target.name, target.year).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                info!(name = %target.name, "movie not found");
                summary.not_found += 1;
                continue;
            },
            Err(err) => {
                warn!(name = %target.name, error = %err, "search failed");
                summary.failed += 1;
                continue;
            },
        };

        let details = match source.movie_details(tmdb_id).await {
            Ok(details) => details,
            Err(err) => {
                warn!(name = %target.name, tmdb_id = tmdb_id, error = %err, "detail fetch failed");
                summary.failed += 1;
                continue;
            },
        };

        let slug = slugify(&details.title);

        let local_poster =
            posters.cache_poster(fetcher, details.poster_path.as_deref(), &slug).await;

        // Provider lookup failing is not worth discarding the record
        // over; it just ships with no availability.
        let regions = match source.watch_providers(tmdb_id).await {
            Ok(regions) => regions,
            Err(err) => {
                warn!(slug = %slug, error = %err, "provider lookup failed");
                ProviderRegions::default()
            },
        };
        let provider_list = providers::normalize(
            &regions,
            &config.primary_region,
            &config.fallback_region,
            &details.title,
        );

        let tags = record::derive_tags(&target.tags, details.popularity, config.trending_threshold);
        let built = record::build_record(target, &details, slug.clone(), local_poster, provider_list, tags);

        match catalog.upsert(built) {
            Reconciliation::Added(id) => {
                info!(slug = %slug, id = id, "added");
                summary.added += 1;
            },
            Reconciliation::Updated(id) => {
                info!(slug = %slug, id = id, "updated");
                summary.updated += 1;
            },
        }
    }

    summary
}
