use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One curated ingestion request: a fuzzy title plus the editorial
/// categorization it should carry into the catalog.
#[derive(Clone, Debug)]
pub struct TargetSpec {
    pub name: String,
    pub year: Option<i32>,
    pub category: String,
    pub tags: Vec<String>,
}

/// A target as written in the targets file, before its category label
/// is attached by the loader.
#[derive(Clone, Debug, Deserialize)]
pub struct TargetEntry {
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AccessType {
    Stream,
    Rent,
    Buy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub access_type: AccessType,
    pub link: String,
    #[serde(rename = "logo")]
    pub logo_path: Option<String>,
}

const UNANNOUNCED: &str = "Coming Soon";

/// Release year, or the sentinel the catalog file uses for titles with
/// no upstream release date and no caller-supplied year.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReleaseYear {
    Known(i32),
    Unannounced,
}

impl Serialize for ReleaseYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReleaseYear::Known(year) => serializer.serialize_i32(*year),
            ReleaseYear::Unannounced => serializer.serialize_str(UNANNOUNCED),
        }
    }
}

impl<'de> Deserialize<'de> for ReleaseYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(i32),
            Text(String),
        }
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Num(year) => ReleaseYear::Known(year),
            Repr::Text(_) => ReleaseYear::Unannounced,
        })
    }
}

/// The catalog's unit of persistence. Field names are the contract with
/// the presentation layer; `slug` is the identity key across runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: u32,
    pub title: String,
    pub slug: String,
    pub year: ReleaseYear,
    #[serde(rename = "genre")]
    pub genre_primary: String,
    pub genres: Vec<String>,
    pub rating: String,
    pub duration: String,
    pub poster: String,
    pub trailer: String,
    pub description: String,
    pub platforms: Vec<String>,
    pub providers: Vec<ProviderEntry>,
    pub language: String,
    pub tags: Vec<String>,
    pub featured: bool,
}
