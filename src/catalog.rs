use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use tracing::debug;

use crate::{error::AppResult, models::MovieRecord};

/// The persisted movie collection plus the monotonic id counter.
/// Records keep file order (insertion order); the slug index makes
/// reconciliation by identity key an O(1) lookup.
pub struct Catalog {
    records: Vec<MovieRecord>,
    index: HashMap<String, usize>,
    next_id: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Reconciliation {
    Added(u32),
    Updated(u32),
}

impl Catalog {
    pub fn new() -> Self {
        Self { records: Vec::new(), index: HashMap::new(), next_id: 1 }
    }

    /// Load the persisted catalog. A missing file is an empty catalog;
    /// a file that exists but does not parse is fatal.
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no existing catalog, starting empty");
            return Ok(Self::new());
        }

        let raw = fs::read_to_string(path)?;
        let records: Vec<MovieRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("malformed catalog file {}", path.display()))?;

        let mut catalog = Self::new();
        catalog.next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        for (i, record) in records.iter().enumerate() {
            catalog.index.insert(record.slug.clone(), i);
        }
        catalog.records = records;
        Ok(catalog)
    }

    /// Merge a freshly built record by slug. An existing record keeps
    /// its id and the union of old and new tags; every other field is
    /// replaced. A new slug gets the next id and is appended.
    pub fn upsert(&mut self, mut record: MovieRecord) -> Reconciliation {
        match self.index.get(&record.slug) {
            Some(&i) => {
                let existing = &self.records[i];
                record.id = existing.id;
                record.tags = union_tags(&existing.tags, &record.tags);
                record.featured = crate::record::is_featured(&record.tags);
                self.records[i] = record;
                Reconciliation::Updated(self.records[i].id)
            },
            None => {
                record.id = self.next_id;
                self.next_id += 1;
                self.index.insert(record.slug.clone(), self.records.len());
                self.records.push(record);
                Reconciliation::Added(self.next_id - 1)
            },
        }
    }

    pub fn get(&self, slug: &str) -> Option<&MovieRecord> {
        self.index.get(slug).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize the whole catalog in one write. Failure here is fatal
    /// for the run; nothing is considered committed until it succeeds.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Union preserving first-seen order: every existing tag survives,
/// new tags append.
fn union_tags(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut out: Vec<String> = existing.to_vec();
    for tag in incoming {
        if !out.contains(tag) {
            out.push(tag.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReleaseYear;

    fn record(slug: &str, tags: &[&str]) -> MovieRecord {
        MovieRecord {
            id: 0,
            title: slug.to_string(),
            slug: slug.to_string(),
            year: ReleaseYear::Known(2025),
            genre_primary: "Action".to_string(),
            genres: vec!["Action".to_string()],
            rating: "7.8".to_string(),
            duration: "2h 30m".to_string(),
            poster: "/p.jpg".to_string(),
            trailer: String::new(),
            description: String::new(),
            platforms: vec![],
            providers: vec![],
            language: "HI".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            featured: false,
        }
    }

    #[test]
    fn new_slugs_get_increasing_unique_ids() {
        let mut catalog = Catalog::new();
        assert_eq!(catalog.upsert(record("kill", &[])), Reconciliation::Added(1));
        assert_eq!(catalog.upsert(record("dhoom", &[])), Reconciliation::Added(2));
        assert_eq!(catalog.upsert(record("stree", &[])), Reconciliation::Added(3));

        let ids: Vec<u32> = ["kill", "dhoom", "stree"]
            .iter()
            .map(|s| catalog.get(s).unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn reprocessing_a_slug_keeps_its_id_and_unions_tags() {
        let mut catalog = Catalog::new();
        catalog.upsert(record("dhurandhar", &["Action", "India"]));
        catalog.upsert(record("twisters", &["Netflix"]));

        let outcome = catalog.upsert(record("dhurandhar", &["Netflix", "India"]));
        assert_eq!(outcome, Reconciliation::Updated(1));

        let merged = catalog.get("dhurandhar").unwrap();
        assert_eq!(merged.id, 1);
        assert_eq!(merged.tags, vec!["Action", "India", "Netflix"]);
        assert!(merged.featured);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn identical_rerun_changes_nothing() {
        let mut catalog = Catalog::new();
        for _ in 0..2 {
            catalog.upsert(record("kill", &["Action", "India"]));
            catalog.upsert(record("bhoot", &["Horror"]));
        }

        assert_eq!(catalog.len(), 2);
        let kill = catalog.get("kill").unwrap();
        assert_eq!(kill.id, 1);
        assert_eq!(kill.tags, vec!["Action", "India"]);
        let bhoot = catalog.get("bhoot").unwrap();
        assert_eq!(bhoot.id, 2);
        assert_eq!(bhoot.tags, vec!["Horror"]);
    }

    #[test]
    fn ids_continue_after_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");

        let mut catalog = Catalog::new();
        catalog.upsert(record("kill", &["Action"]));
        catalog.upsert(record("dhoom", &["Action"]));
        catalog.save(&path).unwrap();

        let mut reloaded = Catalog::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.upsert(record("stree", &["Horror"])), Reconciliation::Added(3));
        assert_eq!(reloaded.upsert(record("kill", &["Action"])), Reconciliation::Updated(1));
    }

    #[test]
    fn missing_file_loads_as_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::load(&dir.path().join("absent.json")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.json");
        fs::write(&path, "not json").unwrap();
        assert!(Catalog::load(&path).is_err());
    }

    #[test]
    fn save_round_trips_records_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("movies.json");

        let mut catalog = Catalog::new();
        catalog.upsert(record("tumbbad", &["Horror", "India"]));
        catalog.upsert(record("bulbbul", &["Horror", "Netflix"]));
        catalog.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let records: Vec<MovieRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].slug, "tumbbad");
        assert_eq!(records[1].slug, "bulbbul");
        assert_eq!(records[1].id, 2);
    }
}
