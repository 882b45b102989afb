//! JSON catalog loader.
//!
//! The file is a JSON array of entries:
//!
//! ```json
//! [
//!   { "id": "koala", "name": "Koala", "category": "animals", "tier": "common",
//!     "facts": ["I sleep up to 20 hours a day.", "I live in eucalyptus trees."],
//!     "media_hint": "koala in a tree" }
//! ]
//! ```

use std::path::Path;

use serde::Deserialize;

use quizcraft_domain::{CategoryTag, ContentCatalog, DisplayName, DomainError, FameTier, ItemId, QuizItem};

#[derive(Debug, thiserror::Error)]
pub enum CatalogFileError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid catalog entry: {0}")]
    Invalid(#[from] DomainError),
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    name: String,
    category: String,
    tier: String,
    facts: Vec<String>,
    #[serde(default)]
    media_hint: Option<String>,
}

impl TryFrom<CatalogEntry> for QuizItem {
    type Error = DomainError;

    fn try_from(entry: CatalogEntry) -> Result<Self, Self::Error> {
        let item = QuizItem::new(
            ItemId::new(entry.id)?,
            DisplayName::new(entry.name)?,
            CategoryTag::new(entry.category)?,
            entry.tier.parse::<FameTier>()?,
            entry.facts,
        )?;
        Ok(match entry.media_hint {
            Some(hint) => item.with_media_hint(hint),
            None => item,
        })
    }
}

/// Parse a catalog from JSON text.
pub fn parse_catalog(json: &str) -> Result<ContentCatalog, CatalogFileError> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
    let items = entries
        .into_iter()
        .map(QuizItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ContentCatalog::new(items)?)
}

/// Read and parse the catalog file at `path`.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<ContentCatalog, CatalogFileError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&json)?;
    tracing::info!(path = %path.display(), items = catalog.len(), "Loaded content catalog");
    Ok(catalog)
}
