use crate::{
    models::{MovieRecord, ProviderEntry, ReleaseYear, TargetSpec},
    tmdb::{MovieDetails, Video},
};

const DESCRIPTION_WORD_LIMIT: usize = 250;
const TRENDING_TAG: &str = "Trending";

/// URL-safe identity key for a canonical title: lower-case ASCII
/// alphanumerics, everything else collapsed to single hyphens.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}

/// Best embeddable trailer: official YouTube trailer, then any YouTube
/// trailer, then a teaser. Empty string when nothing qualifies.
pub fn pick_trailer(videos: &[Video]) -> String {
    let youtube = |v: &&Video| v.site == "YouTube";
    let pick = videos
        .iter()
        .find(|v| youtube(v) && v.kind == "Trailer" && v.name.contains("Official"))
        .or_else(|| videos.iter().find(|v| youtube(v) && v.kind == "Trailer"))
        .or_else(|| videos.iter().find(|v| youtube(v) && v.kind == "Teaser"));

    match pick {
        Some(v) => format!("https://www.youtube.com/embed/{}", v.key),
        None => String::new(),
    }
}

pub fn format_rating(vote_average: Option<f64>) -> String {
    match vote_average {
        Some(v) if v > 0.0 => format!("{v:.1}"),
        _ => "N/A".to_string(),
    }
}

pub fn format_duration(runtime: Option<u32>) -> String {
    match runtime {
        Some(mins) if mins > 0 => format!("{}h {}m", mins / 60, mins % 60),
        _ => "TBA".to_string(),
    }
}

/// Word-boundary-safe truncation; the ellipsis is only appended when
/// something was actually cut.
pub fn truncate_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > limit {
        format!("{}...", words[..limit].join(" "))
    } else {
        text.to_string()
    }
}

/// Year from the upstream release date, else the target's year, else
/// the unannounced sentinel.
pub fn derive_year(release_date: Option<&str>, target_year: Option<i32>) -> ReleaseYear {
    release_date
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse().ok())
        .or(target_year)
        .map(ReleaseYear::Known)
        .unwrap_or(ReleaseYear::Unannounced)
}

/// Caller-supplied tags plus a popularity-derived trending tag,
/// deduplicated preserving first-seen order.
pub fn derive_tags(target_tags: &[String], popularity: Option<f64>, threshold: f64) -> Vec<String> {
    let mut tags: Vec<String> = target_tags.to_vec();
    if popularity.is_some_and(|p| p > threshold) {
        tags.push(TRENDING_TAG.to_string());
    }

    let mut out = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

pub fn is_featured(tags: &[String]) -> bool {
    tags.iter().any(|t| t == "Netflix" || t == TRENDING_TAG)
}

/// Assemble the catalog record for one resolved title. The id is a
/// placeholder until reconciliation assigns or preserves the real one.
pub fn build_record(
    target: &TargetSpec,
    details: &MovieDetails,
    slug: String,
    local_poster: Option<String>,
    providers: Vec<ProviderEntry>,
    tags: Vec<String>,
) -> MovieRecord {
    let genres: Vec<String> = details.genres.iter().map(|g| g.name.clone()).collect();
    let genre_primary =
        genres.first().cloned().unwrap_or_else(|| "Unknown".to_string());

    let poster = local_poster
        .or_else(|| details.poster_path.clone())
        .unwrap_or_default();

    let featured = is_featured(&tags);

    MovieRecord {
        id: 0,
        title: details.title.clone(),
        slug,
        year: derive_year(details.release_date.as_deref(), target.year),
        genre_primary,
        genres,
        rating: format_rating(details.vote_average),
        duration: format_duration(details.runtime),
        poster,
        trailer: pick_trailer(&details.videos.results),
        description: truncate_words(
            details.overview.as_deref().unwrap_or_default(),
            DESCRIPTION_WORD_LIMIT,
        ),
        platforms: providers.iter().take(2).map(|p| p.name.clone()).collect(),
        providers,
        language: details.original_language.to_uppercase(),
        tags,
        featured,
    }
}
