//! Import of WinFF preset files
//!
//! WinFF stores presets as `<presets><name><label/><params/><extension/>
//! <category/></name>…</presets>`; each child element of the root is one preset.

use super::presets::{PresetBook, validate_entry};
use crate::tools::validate_file_exists;
use anyhow::{Context, Result};
use log::warn;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default)]
pub struct WinffImport {
    pub presets: PresetBook,
    pub skipped: usize,
}

pub fn import_winff_file(path: &Path) -> Result<WinffImport> {
    validate_file_exists(path)?;
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_winff_presets(&xml)
}

pub fn parse_winff_presets(xml: &str) -> Result<WinffImport> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut import = WinffImport::default();
    let mut depth = 0usize;
    let mut current: Option<HashMap<String, String>> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event().context("Malformed preset XML")? {
            Event::Start(e) => {
                depth += 1;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match depth {
                    2 => current = Some(HashMap::new()),
                    3 => field = Some(name),
                    _ => {}
                }
            }
            Event::Text(e) => {
                if let (Some(preset), Some(name)) = (current.as_mut(), field.as_ref()) {
                    let text = e.unescape().context("Malformed preset XML text")?;
                    preset.entry(name.clone()).or_default().push_str(&text);
                }
            }
            Event::CData(e) => {
                if let (Some(preset), Some(name)) = (current.as_mut(), field.as_ref()) {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    preset.entry(name.clone()).or_default().push_str(&text);
                }
            }
            Event::End(_) => {
                match depth {
                    3 => field = None,
                    2 => {
                        if let Some(preset) = current.take() {
                            import.add(&preset);
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(import)
}

impl WinffImport {
    fn add(&mut self, fields: &HashMap<String, String>) {
        let get = |key: &str| fields.get(key).map(|v| v.trim()).unwrap_or_default();
        let (label, category) = (get("label"), get("category"));

        if label.is_empty() || category.is_empty() {
            warn!("Skipping WinFF preset without label or category");
            self.skipped += 1;
            return;
        }

        match validate_entry(get("params"), get("extension")) {
            Ok(entry) => {
                self.presets
                    .insert_entry(category.to_string(), label.to_string(), entry);
            }
            Err(e) => {
                warn!("Skipping WinFF preset {category}/{label}: {e}");
                self.skipped += 1;
            }
        }
    }
}
