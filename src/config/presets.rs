use crate::tools::{ArgumentTemplate, TemplateError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Compiled-in presets; restored on demand and used when no user file exists.
const DEFAULT_PRESETS_JSON: &str = include_str!("../../data/presets.json");

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresetError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("category already exists: {0}")]
    DuplicateCategory(String),
    #[error("no such category: {0}")]
    UnknownCategory(String),
    #[error("preset already exists in {category}: {name}")]
    DuplicatePreset { category: String, name: String },
    #[error("no such preset in {category}: {name}")]
    UnknownPreset { category: String, name: String },
    #[error("invalid extension: {0:?}")]
    InvalidExtension(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetEntry {
    pub params: String,
    pub extension: String,
}

/// A resolved preset, detached from the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub category: String,
    pub name: String,
    pub params: String,
    pub extension: String,
}

impl Preset {
    #[must_use]
    pub fn new(category: &str, name: &str, params: &str, extension: &str) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            params: params.to_string(),
            extension: extension.to_string(),
        }
    }
}

/// Categories of named presets, as stored in `presets.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetBook {
    categories: BTreeMap<String, BTreeMap<String, PresetEntry>>,
}

fn clean_name(name: &str) -> Result<String, PresetError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PresetError::EmptyName);
    }
    Ok(name.to_string())
}

fn clean_extension(extension: &str) -> Result<String, PresetError> {
    let extension = extension.trim().trim_start_matches('.');
    if extension.is_empty()
        || extension.contains(['/', '\\'])
        || extension.contains(char::is_whitespace)
    {
        return Err(PresetError::InvalidExtension(extension.to_string()));
    }
    Ok(extension.to_string())
}

/// Checks a preset's fields and returns them normalized.
pub fn validate_entry(params: &str, extension: &str) -> Result<PresetEntry, PresetError> {
    ArgumentTemplate::parse(params)?;
    Ok(PresetEntry {
        params: params.trim().to_string(),
        extension: clean_extension(extension)?,
    })
}

impl PresetBook {
    pub fn defaults() -> Result<Self> {
        Self::from_json(DEFAULT_PRESETS_JSON).context("Failed to parse embedded presets")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse presets")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize presets")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn contains_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    #[must_use]
    pub fn preset_names(&self, category: &str) -> Vec<&str> {
        self.categories
            .get(category)
            .map(|presets| presets.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, category: &str, name: &str) -> Option<Preset> {
        let entry = self.categories.get(category)?.get(name)?;
        Some(Preset::new(category, name, &entry.params, &entry.extension))
    }

    /// Every preset whose template or extension would be rejected by `add_preset`.
    #[must_use]
    pub fn invalid_presets(&self) -> Vec<(String, String, PresetError)> {
        self.categories
            .iter()
            .flat_map(|(category, presets)| {
                presets.iter().filter_map(move |(name, entry)| {
                    validate_entry(&entry.params, &entry.extension)
                        .err()
                        .map(|e| (category.clone(), name.clone(), e))
                })
            })
            .collect()
    }

    pub fn add_category(&mut self, name: &str) -> Result<String, PresetError> {
        let name = clean_name(name)?;
        if self.categories.contains_key(&name) {
            return Err(PresetError::DuplicateCategory(name));
        }
        self.categories.insert(name.clone(), BTreeMap::new());
        Ok(name)
    }

    pub fn rename_category(&mut self, current: &str, new_name: &str) -> Result<String, PresetError> {
        let new_name = clean_name(new_name)?;
        if !self.categories.contains_key(current) {
            return Err(PresetError::UnknownCategory(current.to_string()));
        }
        if new_name == current {
            return Ok(new_name);
        }
        if self.categories.contains_key(&new_name) {
            return Err(PresetError::DuplicateCategory(new_name));
        }
        let presets = self.categories.remove(current).unwrap_or_default();
        self.categories.insert(new_name.clone(), presets);
        Ok(new_name)
    }

    pub fn remove_category(&mut self, name: &str) -> Result<(), PresetError> {
        self.categories
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PresetError::UnknownCategory(name.to_string()))
    }

    pub fn add_preset(
        &mut self,
        category: &str,
        name: &str,
        params: &str,
        extension: &str,
    ) -> Result<String, PresetError> {
        let name = clean_name(name)?;
        let entry = validate_entry(params, extension)?;
        let presets = self
            .categories
            .get_mut(category)
            .ok_or_else(|| PresetError::UnknownCategory(category.to_string()))?;
        if presets.contains_key(&name) {
            return Err(PresetError::DuplicatePreset {
                category: category.to_string(),
                name,
            });
        }
        presets.insert(name.clone(), entry);
        Ok(name)
    }

    /// Replaces a preset's fields, renaming it when `new_name` differs.
    pub fn update_preset(
        &mut self,
        category: &str,
        current: &str,
        new_name: &str,
        params: &str,
        extension: &str,
    ) -> Result<String, PresetError> {
        let new_name = clean_name(new_name)?;
        let entry = validate_entry(params, extension)?;
        let presets = self
            .categories
            .get_mut(category)
            .ok_or_else(|| PresetError::UnknownCategory(category.to_string()))?;
        if !presets.contains_key(current) {
            return Err(PresetError::UnknownPreset {
                category: category.to_string(),
                name: current.to_string(),
            });
        }
        if new_name != current && presets.contains_key(&new_name) {
            return Err(PresetError::DuplicatePreset {
                category: category.to_string(),
                name: new_name,
            });
        }
        presets.remove(current);
        presets.insert(new_name.clone(), entry);
        Ok(new_name)
    }

    pub fn remove_preset(&mut self, category: &str, name: &str) -> Result<(), PresetError> {
        let presets = self
            .categories
            .get_mut(category)
            .ok_or_else(|| PresetError::UnknownCategory(category.to_string()))?;
        presets
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PresetError::UnknownPreset {
                category: category.to_string(),
                name: name.to_string(),
            })
    }

    /// Inserts every preset of `other`, replacing same-named ones. Returns how many were merged.
    pub fn merge(&mut self, other: Self) -> usize {
        let mut merged = 0;
        for (category, presets) in other.categories {
            let target = self.categories.entry(category).or_default();
            for (name, entry) in presets {
                target.insert(name, entry);
                merged += 1;
            }
        }
        merged
    }

    pub(crate) fn insert_entry(&mut self, category: String, name: String, entry: PresetEntry) {
        self.categories.entry(category).or_default().insert(name, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::OverwritePolicy;
    use std::path::Path;

    fn book() -> PresetBook {
        let mut book = PresetBook::default();
        book.add_category("Audio").unwrap();
        book.add_preset("Audio", "MP3", "-vn -b:a 192k", "mp3").unwrap();
        book
    }

    #[test]
    fn test_default_presets_render_paths_once() {
        let book = PresetBook::defaults().unwrap();
        assert!(!book.is_empty());
        assert!(book.invalid_presets().is_empty());

        let input = Path::new("/in/source-file.mkv");
        let output = Path::new("/out/target-file.out");
        for category in book.categories() {
            for name in book.preset_names(category) {
                let preset = book.get(category, name).unwrap();
                let args = ArgumentTemplate::parse(&preset.params)
                    .unwrap()
                    .render(input, output, OverwritePolicy::Keep);
                let count = |p: &Path| args.iter().filter(|a| a.as_os_str() == p.as_os_str()).count();
                assert_eq!(count(input), 1, "{category}/{name}");
                assert_eq!(count(output), 1, "{category}/{name}");
                assert_eq!(args.iter().filter(|a| *a == "-n").count(), 1, "{category}/{name}");
            }
        }
    }

    #[test]
    fn test_json_shape_round_trips() {
        let json = r#"{"Audio":{"MP3":{"params":"-vn","extension":"mp3"}}}"#;
        let book = PresetBook::from_json(json).unwrap();
        assert_eq!(book.get("Audio", "MP3").unwrap().extension, "mp3");
        assert_eq!(PresetBook::from_json(&book.to_json().unwrap()).unwrap(), book);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut book = book();
        assert_eq!(
            book.add_category(" Audio "),
            Err(PresetError::DuplicateCategory("Audio".into()))
        );
        assert_eq!(
            book.add_preset("Audio", "MP3", "-vn", "mp3"),
            Err(PresetError::DuplicatePreset {
                category: "Audio".into(),
                name: "MP3".into()
            })
        );
        assert_eq!(book.add_category("  "), Err(PresetError::EmptyName));
    }

    #[test]
    fn test_invalid_template_and_extension_rejected() {
        let mut book = book();
        assert!(matches!(
            book.add_preset("Audio", "Bad", "-i {input}", "mp3"),
            Err(PresetError::Template(_))
        ));
        assert_eq!(
            book.add_preset("Audio", "Bad", "-vn", "a/b"),
            Err(PresetError::InvalidExtension("a/b".into()))
        );
        assert_eq!(book.add_preset("Audio", "Ok", "-vn", ".ogg").unwrap(), "Ok");
        assert_eq!(book.get("Audio", "Ok").unwrap().extension, "ogg");
    }

    #[test]
    fn test_rename_category_moves_presets() {
        let mut book = book();
        book.rename_category("Audio", "Music").unwrap();
        assert!(!book.contains_category("Audio"));
        assert_eq!(book.preset_names("Music"), ["MP3"]);
        assert_eq!(
            book.rename_category("Audio", "Other"),
            Err(PresetError::UnknownCategory("Audio".into()))
        );
    }

    #[test]
    fn test_update_preset_with_rename() {
        let mut book = book();
        book.add_preset("Audio", "FLAC", "-vn -c:a flac", "flac").unwrap();

        assert!(matches!(
            book.update_preset("Audio", "MP3", "FLAC", "-vn", "mp3"),
            Err(PresetError::DuplicatePreset { .. })
        ));

        book.update_preset("Audio", "MP3", "MP3 320k", "-vn -b:a 320k", "mp3")
            .unwrap();
        assert_eq!(book.preset_names("Audio"), ["FLAC", "MP3 320k"]);
        assert_eq!(book.get("Audio", "MP3 320k").unwrap().params, "-vn -b:a 320k");
    }

    #[test]
    fn test_remove_and_merge() {
        let mut book = book();
        book.remove_preset("Audio", "MP3").unwrap();
        assert!(book.preset_names("Audio").is_empty());
        assert!(book.remove_preset("Audio", "MP3").is_err());

        let merged = book.merge(PresetBook::defaults().unwrap());
        assert!(merged > 0);
        book.remove_category("Audio").unwrap();
        assert!(book.remove_category("Audio").is_err());
    }
}
