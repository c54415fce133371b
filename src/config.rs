use std::path::PathBuf;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub movies_file: PathBuf,
    pub targets_file: PathBuf,
    pub posters_dir: PathBuf,
    pub tmdb_rps: u32,
    pub trending_threshold: f64,
    pub primary_region: String,
    pub fallback_region: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let tmdb_api_key = std::env::var("TMDB_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .context("TMDB_API_KEY must be set")?;
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());
        let tmdb_image_base_url = std::env::var("TMDB_IMAGE_BASE_URL")
            .unwrap_or_else(|_| "https://image.tmdb.org/t/p/w500".to_string());

        let movies_file =
            std::env::var("MOVIES_FILE").unwrap_or_else(|_| "data/movies.json".to_string()).into();
        let targets_file = std::env::var("TARGETS_FILE")
            .unwrap_or_else(|_| "data/targets.json".to_string())
            .into();
        let posters_dir = std::env::var("POSTERS_DIR")
            .unwrap_or_else(|_| "assets/images/posters".to_string())
            .into();

        let tmdb_rps: u32 =
            std::env::var("TMDB_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        let trending_threshold: f64 = std::env::var("TRENDING_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50.0);

        let primary_region =
            std::env::var("PRIMARY_REGION").unwrap_or_else(|_| "IN".to_string()).to_uppercase();
        let fallback_region =
            std::env::var("FALLBACK_REGION").unwrap_or_else(|_| "US".to_string()).to_uppercase();

        Ok(Self {
            tmdb_api_key,
            tmdb_base_url,
            tmdb_image_base_url,
            movies_file,
            targets_file,
            posters_dir,
            tmdb_rps,
            trending_threshold,
            primary_region,
            fallback_region,
        })
    }
}
