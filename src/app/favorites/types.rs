use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FavoriteKind {
    #[default]
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl FavoriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::TvShow => "TV Show",
        }
    }
}

impl fmt::Display for FavoriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown favorite type: {0} (expected Movie or TV Show)")]
pub struct UnknownKind(pub String);

impl FromStr for FavoriteKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "movie" => Ok(Self::Movie),
            "tvshow" | "tv" | "show" => Ok(Self::TvShow),
            _ => Err(UnknownKind(value.to_string())),
        }
    }
}

/// `id` and `created_at` are server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: FavoriteKind,
    pub director: String,
    pub budget: String,
    pub location: String,
    pub duration: String,
    pub year: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePage {
    pub data: Vec<FavoriteEntry>,
    pub has_more: bool,
}
