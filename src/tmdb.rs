use std::{collections::HashMap, num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;

use crate::error::AppResult;

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String, rps: u32) -> Self {
        let limiter =
            Arc::new(RateLimiter::direct(Quota::per_second(NonZeroU32::new(rps.max(1)).unwrap())));
        Self { client, api_key, base_url, limiter }
    }

    /// Search for a movie by title, constrained by year when given.
    /// Returns the highest-relevance result's id, or `None` on a miss.
    pub async fn search_movie(&self, title: &str, year: Option<i32>) -> AppResult<Option<u64>> {
        self.limiter.until_ready().await;

        let url = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        let mut req = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("query", title)]);
        if let Some(year) = year {
            req = req.query(&[("year", year)]);
        }

        let resp: SearchResponse = req.send().await?.error_for_status()?.json().await?;
        Ok(resp.results.into_iter().next().map(|m| m.id))
    }

    /// Full metadata for one movie, with videos and similar titles
    /// expanded inline so the whole payload costs a single request.
    pub async fn movie_details(&self, tmdb_id: u64) -> AppResult<MovieDetails> {
        self.limiter.until_ready().await;

        let url = format!("{}/movie/{}", self.base_url.trim_end_matches('/'), tmdb_id);
        let details: MovieDetails = self
            .client
            .get(url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "videos,similar"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(details)
    }

    /// Region-keyed watch-provider availability for one movie.
    pub async fn watch_providers(&self, tmdb_id: u64) -> AppResult<ProviderRegions> {
        self.limiter.until_ready().await;

        let url =
            format!("{}/movie/{}/watch/providers", self.base_url.trim_end_matches('/'), tmdb_id);
        let resp: ProviderRegions = self
            .client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieDetails {
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub videos: VideoList,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Genre {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Video {
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub key: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProviderRegions {
    #[serde(default)]
    pub results: HashMap<String, RegionAvailability>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RegionAvailability {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<RawProvider>,
    #[serde(default)]
    pub rent: Vec<RawProvider>,
    #[serde(default)]
    pub buy: Vec<RawProvider>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawProvider {
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}
