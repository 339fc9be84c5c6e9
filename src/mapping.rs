//! Phonetic annotation — consonant / vowel lookup per mora.
//!
//! The table is a JSON object keyed by bare symbol text:
//!
//! ```json
//! { "きゃ": { "consonant": "ky", "vowel": "a" }, "ん": { "consonant": null, "vowel": "N" } }
//! ```
//!
//! A missing table or a missing entry is not an error: the affected moras get
//! `null` consonant and vowel and the run continues.

use std::{collections::HashMap, path::Path};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{MoraError, Result};
use crate::query::Mora;
use crate::segment::PunctuationSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PhoneticEntry {
    #[serde(default)]
    pub consonant: Option<String>,
    #[serde(default)]
    pub vowel: Option<String>,
}

/// Symbol → consonant/vowel table, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct PhoneticMap {
    entries: HashMap<String, PhoneticEntry>,
    available: bool,
}

impl PhoneticMap {
    pub fn from_entries(entries: HashMap<String, PhoneticEntry>) -> Self {
        Self { entries, available: true }
    }

    /// A table that resolves nothing; every mora is annotated with nulls.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries = serde_json::from_str(json)
            .map_err(|e| MoraError::json("parse phonetic mapping", e))?;
        Ok(Self::from_entries(entries))
    }

    /// Load the table at `path`.
    ///
    /// A file that does not exist yields [`PhoneticMap::unavailable`] with a
    /// warning. A file that exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "phonetic mapping file does not exist, consonant and vowel will be null"
                );
                return Ok(Self::unavailable());
            }
            Err(e) => return Err(MoraError::io("read phonetic mapping", e)),
        };
        let map = Self::from_json(&data)?;
        debug!(path = %path.display(), entries = map.len(), "loaded phonetic mapping");
        Ok(map)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&PhoneticEntry> {
        self.entries.get(symbol)
    }

    /// Fill `consonant` and `vowel` of every mora from the table.
    pub fn annotate(&self, moras: &mut [Mora], punctuation: &PunctuationSet) {
        for mora in moras {
            let key = punctuation.strip(&mora.text);
            match self.entries.get(&key) {
                Some(entry) => {
                    mora.consonant = entry.consonant.clone();
                    mora.vowel = entry.vowel.clone();
                }
                None => {
                    if self.available {
                        warn!("{}", MoraError::MissingMapping { symbol: key });
                    }
                    mora.consonant = None;
                    mora.vowel = None;
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"{
        "し": { "consonant": "sh", "vowel": "i" },
        "た": { "consonant": "t", "vowel": "a" },
        "ん": { "consonant": null, "vowel": "N" },
        "あ": { "vowel": "a" }
    }"#;

    fn moras(texts: &[&str]) -> Vec<Mora> {
        texts.iter().map(|t| Mora::timed(*t, 0.0, 0.1, 0.1)).collect()
    }

    #[test]
    fn test_annotate_strips_punctuation() {
        let map = PhoneticMap::from_json(TABLE).unwrap();
        let mut m = moras(&["し", "た。"]);
        map.annotate(&mut m, &PunctuationSet::default());
        assert_eq!(m[0].consonant.as_deref(), Some("sh"));
        assert_eq!(m[0].vowel.as_deref(), Some("i"));
        assert_eq!(m[1].consonant.as_deref(), Some("t"));
        assert_eq!(m[1].vowel.as_deref(), Some("a"));
    }

    #[test]
    fn test_partial_entries() {
        let map = PhoneticMap::from_json(TABLE).unwrap();
        let mut m = moras(&["ん", "あ"]);
        map.annotate(&mut m, &PunctuationSet::default());
        assert_eq!(m[0].consonant, None);
        assert_eq!(m[0].vowel.as_deref(), Some("N"));
        assert_eq!(m[1].consonant, None);
        assert_eq!(m[1].vowel.as_deref(), Some("a"));
    }

    #[test]
    fn test_unknown_symbol_is_null() {
        let map = PhoneticMap::from_json(TABLE).unwrap();
        let mut m = moras(&["ゔ"]);
        m[0].vowel = Some("stale".into());
        map.annotate(&mut m, &PunctuationSet::default());
        assert_eq!(m[0].consonant, None);
        assert_eq!(m[0].vowel, None);
    }

    #[test]
    fn test_missing_file_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let map = PhoneticMap::load(&dir.path().join("nope.json")).unwrap();
        assert!(!map.is_available());

        let mut m = moras(&["し", "た。"]);
        map.annotate(&mut m, &PunctuationSet::default());
        assert!(m.iter().all(|m| m.consonant.is_none() && m.vowel.is_none()));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        std::fs::write(&path, TABLE).unwrap();
        let map = PhoneticMap::load(&path).unwrap();
        assert!(map.is_available());
        assert_eq!(map.len(), 4);
        assert_eq!(map.get("た").and_then(|e| e.consonant.as_deref()), Some("t"));
    }

    #[test]
    fn test_bundled_table() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("files/mapping.json");
        let map = PhoneticMap::load(&path).unwrap();
        let mut m = moras(&["し", "た。", "ん"]);
        map.annotate(&mut m, &PunctuationSet::default());
        assert_eq!(m[0].consonant.as_deref(), Some("sh"));
        assert_eq!(m[1].vowel.as_deref(), Some("a"));
        assert_eq!(m[2].vowel.as_deref(), Some("N"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(PhoneticMap::load(&path), Err(MoraError::Json { .. })));
    }
}
