use std::collections::HashSet;

use crate::{
    models::{AccessType, ProviderEntry},
    tmdb::{ProviderRegions, RawProvider, RegionAvailability},
};

/// Platforms we can deep-link into directly instead of pointing at the
/// region's generic availability page.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    Netflix,
    PrimeVideo,
    Hotstar,
    YouTube,
    AppleTv,
    JioCinema,
    Zee5,
    SonyLiv,
}

/// Case-insensitive substring patterns, scanned in order. Upstream
/// display names vary ("Amazon Prime Video", "Disney Plus Hotstar"),
/// so detection is by token rather than exact name.
const PATTERNS: &[(&str, Platform)] = &[
    ("netflix", Platform::Netflix),
    ("amazon prime", Platform::PrimeVideo),
    ("prime video", Platform::PrimeVideo),
    ("hotstar", Platform::Hotstar),
    ("disney", Platform::Hotstar),
    ("youtube", Platform::YouTube),
    ("apple", Platform::AppleTv),
    ("jiocinema", Platform::JioCinema),
    ("zee5", Platform::Zee5),
    ("sonyliv", Platform::SonyLiv),
];

impl Platform {
    pub fn detect(provider_name: &str) -> Option<Platform> {
        let name = provider_name.to_lowercase();
        PATTERNS.iter().find(|(pat, _)| name.contains(pat)).map(|(_, platform)| *platform)
    }

    /// Platform search URL seeded with the movie title.
    pub fn search_url(self, title: &str) -> String {
        let q = urlencoding::encode(title);
        match self {
            Platform::Netflix => format!("https://www.netflix.com/search?q={q}"),
            Platform::PrimeVideo => format!("https://www.amazon.in/s?k={q}&i=instant-video"),
            Platform::Hotstar => format!("https://www.hotstar.com/in/search?q={q}"),
            Platform::YouTube => format!("https://www.youtube.com/results?search_query={q}"),
            Platform::AppleTv => format!("https://tv.apple.com/search?term={q}"),
            Platform::JioCinema => format!("https://www.jiocinema.com/search/{q}"),
            Platform::Zee5 => format!("https://www.zee5.com/search?q={q}"),
            Platform::SonyLiv => format!("https://www.sonyliv.com/search/{q}"),
        }
    }
}

/// Flatten region availability into a deduplicated provider list.
///
/// The primary region wins; the fallback region is only consulted when
/// the primary has no data at all. Buckets are scanned stream, rent,
/// buy, and a provider name seen in an earlier bucket keeps its earlier
/// access type.
pub fn normalize(
    regions: &ProviderRegions,
    primary_region: &str,
    fallback_region: &str,
    title: &str,
) -> Vec<ProviderEntry> {
    let Some(region) =
        regions.results.get(primary_region).or_else(|| regions.results.get(fallback_region))
    else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut seen = HashSet::new();

    let buckets = [
        (&region.flatrate, AccessType::Stream),
        (&region.rent, AccessType::Rent),
        (&region.buy, AccessType::Buy),
    ];

    for (bucket, access_type) in buckets {
        for provider in bucket.iter() {
            if !seen.insert(provider.provider_name.clone()) {
                continue;
            }
            out.push(entry_for(provider, access_type, region, title));
        }
    }

    out
}

fn entry_for(
    provider: &RawProvider,
    access_type: AccessType,
    region: &RegionAvailability,
    title: &str,
) -> ProviderEntry {
    let link = match Platform::detect(&provider.provider_name) {
        Some(platform) => platform.search_url(title),
        None => region.link.clone().unwrap_or_default(),
    };
    ProviderEntry {
        name: provider.provider_name.clone(),
        access_type,
        link,
        logo_path: provider.logo_path.clone(),
    }
}
