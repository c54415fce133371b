use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use image::{ExtendedColorType, codecs::webp::WebPEncoder, imageops::FilterType};
use tracing::{debug, info, warn};

use crate::error::AppResult;

const POSTER_WIDTH: u32 = 440;
const POSTER_HEIGHT: u32 = 660;

/// Site-relative prefix the presentation layer expects in `poster`.
const PUBLIC_PREFIX: &str = "/assets/images/posters";

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AppResult<Vec<u8>>;
}

pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> AppResult<Vec<u8>> {
        let bytes =
            self.client.get(url).send().await?.error_for_status()?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

/// Materializes locally cached poster assets, one WebP per slug.
/// Presence of the cache file is the idempotence signal: repeated runs
/// for a cached slug never touch the network.
pub struct PosterCache {
    dir: PathBuf,
    image_base_url: String,
}

impl PosterCache {
    pub fn new(dir: PathBuf, image_base_url: String) -> Self {
        Self { dir, image_base_url }
    }

    /// Local poster reference for a slug, or `None` when the asset
    /// could not be materialized (caller keeps the upstream path).
    pub async fn cache_poster<F: ImageFetcher>(
        &self,
        fetcher: &F,
        poster_path: Option<&str>,
        slug: &str,
    ) -> Option<String> {
        let poster_path = poster_path?;
        let file = self.dir.join(format!("{slug}.webp"));
        let reference = format!("{PUBLIC_PREFIX}/{slug}.webp");

        if file.exists() {
            debug!(slug = %slug, "poster already cached");
            return Some(reference);
        }

        match self.download_and_transcode(fetcher, poster_path, &file).await {
            Ok(()) => {
                info!(slug = %slug, "saved poster");
                Some(reference)
            },
            Err(err) => {
                warn!(slug = %slug, error = %err, "poster pipeline failed");
                None
            },
        }
    }

    async fn download_and_transcode<F: ImageFetcher>(
        &self,
        fetcher: &F,
        poster_path: &str,
        out_path: &Path,
    ) -> AppResult<()> {
        let url = format!("{}{}", self.image_base_url, poster_path);
        let bytes = fetcher.fetch(&url).await?;

        let resized = image::load_from_memory(&bytes)?
            .resize_exact(POSTER_WIDTH, POSTER_HEIGHT, FilterType::Lanczos3)
            .to_rgba8();

        let mut encoded = Vec::new();
        WebPEncoder::new_lossless(&mut encoded).encode(
            &resized,
            POSTER_WIDTH,
            POSTER_HEIGHT,
            ExtendedColorType::Rgba8,
        )?;

        fs::create_dir_all(&self.dir)?;
        fs::write(out_path, &encoded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Cursor,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    struct CountingFetcher {
        calls: AtomicUsize,
        response: Option<Vec<u8>>,
    }

    impl CountingFetcher {
        fn returning(bytes: Vec<u8>) -> Self {
            Self { calls: AtomicUsize::new(0), response: Some(bytes) }
        }

        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), response: None }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> AppResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Some(bytes) => Ok(bytes.clone()),
                None => Err(anyhow::anyhow!("simulated download failure").into()),
            }
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 6, image::Rgba([40, 20, 90, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img).write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn miss_downloads_resizes_and_writes_webp() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PosterCache::new(dir.path().to_path_buf(), "http://img.test".to_string());
        let fetcher = CountingFetcher::returning(png_bytes());

        let out = cache.cache_poster(&fetcher, Some("/kill.jpg"), "kill").await;

        assert_eq!(out.as_deref(), Some("/assets/images/posters/kill.webp"));
        assert_eq!(fetcher.call_count(), 1);

        let written = fs::read(dir.path().join("kill.webp")).unwrap();
        let img = image::load_from_memory(&written).unwrap();
        assert_eq!((img.width(), img.height()), (POSTER_WIDTH, POSTER_HEIGHT));
    }

    #[tokio::test]
    async fn cached_file_short_circuits_without_fetching() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("kill.webp"), b"already here").unwrap();
        let cache = PosterCache::new(dir.path().to_path_buf(), "http://img.test".to_string());
        let fetcher = CountingFetcher::returning(png_bytes());

        let out = cache.cache_poster(&fetcher, Some("/kill.jpg"), "kill").await;

        assert_eq!(out.as_deref(), Some("/assets/images/posters/kill.webp"));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn download_failure_yields_no_local_asset() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PosterCache::new(dir.path().to_path_buf(), "http://img.test".to_string());
        let fetcher = CountingFetcher::failing();

        let out = cache.cache_poster(&fetcher, Some("/kill.jpg"), "kill").await;

        assert!(out.is_none());
        assert!(!dir.path().join("kill.webp").exists());
    }

    #[tokio::test]
    async fn missing_upstream_path_skips_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PosterCache::new(dir.path().to_path_buf(), "http://img.test".to_string());
        let fetcher = CountingFetcher::returning(png_bytes());

        let out = cache.cache_poster(&fetcher, None, "kill").await;

        assert!(out.is_none());
        assert_eq!(fetcher.call_count(), 0);
    }
}
