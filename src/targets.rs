use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Context;
use tracing::debug;

use crate::{
    error::AppResult,
    models::{TargetEntry, TargetSpec},
};

/// Curated categories flatten in this order so runs are deterministic
/// regardless of how the targets file orders its keys. Categories not
/// listed here follow, sorted by name.
const CATEGORY_ORDER: &[&str] = &["Action", "Netflix", "India", "Other", "Horror"];

/// Load the curated target list: a JSON object mapping category label
/// to entries, flattened with each entry stamped with its category.
pub fn load(path: &Path) -> AppResult<Vec<TargetSpec>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read targets file {}", path.display()))?;
    let mut by_category: BTreeMap<String, Vec<TargetEntry>> = serde_json::from_str(&raw)
        .with_context(|| format!("malformed targets file {}", path.display()))?;

    let mut out = Vec::new();
    for category in CATEGORY_ORDER {
        if let Some(entries) = by_category.remove(*category) {
            flatten(&mut out, category, entries);
        }
    }
    for (category, entries) in by_category {
        flatten(&mut out, &category, entries);
    }

    debug!(targets = out.len(), "loaded target list");
    Ok(out)
}

fn flatten(out: &mut Vec<TargetSpec>, category: &str, entries: Vec<TargetEntry>) {
    for entry in entries {
        out.push(TargetSpec {
            name: entry.name,
            year: entry.year,
            category: category.to_string(),
            tags: entry.tags,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_targets(json: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("targets.json");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(json.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn flattens_categories_in_declared_order() {
        let (_dir, path) = write_targets(
            r#"{
                "Horror": [{"name": "Tumbbad", "year": 2018, "tags": ["Horror", "India"]}],
                "Action": [
                    {"name": "Kill", "year": 2023, "tags": ["Action", "India"]},
                    {"name": "Dhurandhar", "year": 2025, "tags": ["Action", "India"]}
                ],
                "Festival": [{"name": "Sinners"}]
            }"#,
        );

        let targets = load(&path).unwrap();
        let names: Vec<_> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Kill", "Dhurandhar", "Tumbbad", "Sinners"]);
        assert_eq!(targets[0].category, "Action");
        assert_eq!(targets[2].category, "Horror");
        assert_eq!(targets[3].category, "Festival");
        assert_eq!(targets[3].year, None);
        assert!(targets[3].tags.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).is_err());
    }
}
