//! In-memory template collection with JSON-file persistence.
//!
//! ## Layout
//!
//! ```text
//! templates/                    # store directory
//! ├── product_photography.json  # one record per template, named after it
//! └── my_template.json
//! ```
//!
//! ## Ordering
//!
//! The collection keeps insertion order: built-ins first, then records in
//! load order (file name order within a directory), then explicit `add`
//! calls. Replacing an existing name keeps its original position.
//!
//! ## Consistency
//!
//! Memory is the source of truth. `add` never touches disk; `save` writes one
//! record; `delete` removes both. A record that fails to load is logged and
//! skipped so one bad file never hides the rest of the collection.
//!
//! Mutations take `&mut self`; share a store across threads behind a lock.

use super::builtin::default_templates;
use super::template::{Template, TemplateError, validate_name};
use crate::config::TemplatesConfig;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of persisted records.
const RECORD_EXTENSION: &str = "json";

/// Optional `list` filters. All supplied filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    pub tag: Option<String>,
    pub style: Option<String>,
}

impl TemplateFilter {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            style: None,
        }
    }

    pub fn style(style: impl Into<String>) -> Self {
        Self {
            tag: None,
            style: Some(style.into()),
        }
    }

    fn matches(&self, template: &Template) -> bool {
        self.tag.as_deref().is_none_or(|tag| template.has_tag(tag))
            && self.style.as_deref().is_none_or(|s| template.style == s)
    }
}

/// Outcome of a directory scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Names loaded, in load order.
    pub loaded: Vec<String>,
    /// Record files that failed to read or parse.
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    directory: PathBuf,
    templates: Vec<Template>,
    /// name → position in `templates`.
    index: HashMap<String, usize>,
}

impl TemplateStore {
    /// Built-in templates plus every valid record found in `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let mut store = Self::with_builtins(directory);
        store.load_all(None);
        store
    }

    /// Built-in templates only; `directory` is used for later saves.
    pub fn with_builtins(directory: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            directory: directory.into(),
            templates: Vec::new(),
            index: HashMap::new(),
        };
        for template in default_templates() {
            store.add(template);
        }
        store
    }

    /// Build from the `[templates]` config section, honoring `auto_load`.
    pub fn from_config(config: &TemplatesConfig) -> Self {
        if config.auto_load {
            Self::new(&config.directory)
        } else {
            Self::with_builtins(&config.directory)
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Insert or replace by name. Last write wins.
    pub fn add(&mut self, template: Template) {
        match self.index.get(&template.name) {
            Some(&pos) => {
                tracing::debug!(name = %template.name, "replacing template");
                self.templates[pos] = template;
            }
            None => {
                self.index
                    .insert(template.name.clone(), self.templates.len());
                self.templates.push(template);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.index.get(name).map(|&pos| &self.templates[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Template names in collection order.
    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    /// Templates matching every supplied filter, in collection order.
    pub fn list(&self, filter: &TemplateFilter) -> Vec<&Template> {
        self.templates.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Case-insensitive substring search over name, description and tags.
    pub fn search(&self, query: &str) -> Vec<&Template> {
        let query = query.to_lowercase();
        self.templates
            .iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&query)
                    || t.description.to_lowercase().contains(&query)
                    || t.tags.iter().any(|tag| tag.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Remove a template and its default record file.
    ///
    /// Returns whether the template existed in memory.
    pub fn delete(&mut self, name: &str) -> bool {
        let Some(pos) = self.index.remove(name) else {
            return false;
        };
        self.templates.remove(pos);
        self.reindex();

        // A name that is not a valid file name never had a record
        let Ok(path) = self.record_path(name) else {
            return true;
        };
        if path.exists()
            && let Err(e) = fs::remove_file(&path)
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove template record");
        }
        true
    }

    /// Default record location for a template name. Names that would leave
    /// the store directory are rejected.
    pub fn record_path(&self, name: &str) -> Result<PathBuf, TemplateError> {
        validate_name(name)?;
        Ok(self.directory.join(format!("{name}.{RECORD_EXTENSION}")))
    }

    /// Write one template as a pretty-printed JSON record.
    ///
    /// Writes to `target` when given, otherwise to [`record_path`](Self::record_path).
    /// In-memory state is not touched either way.
    pub fn save(&self, template: &Template, target: Option<&Path>) -> Result<PathBuf, TemplateError> {
        let path = match target {
            Some(p) => p.to_path_buf(),
            None => self.record_path(&template.name)?,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| TemplateError::Persistence {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&template.to_record())?;
        fs::write(&path, json).map_err(|source| TemplateError::Persistence {
            path: path.clone(),
            source,
        })?;
        tracing::info!(name = %template.name, path = %path.display(), "saved template");
        Ok(path)
    }

    /// Load a single record file and insert it.
    pub fn load_file(&mut self, path: &Path) -> Result<Template, TemplateError> {
        let content = fs::read_to_string(path).map_err(|source| TemplateError::Persistence {
            path: path.to_path_buf(),
            source,
        })?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| TemplateError::InvalidRecord(format!("{}: {e}", path.display())))?;
        let template = Template::from_record(&value)?;
        self.add(template.clone());
        Ok(template)
    }

    /// Load every `*.json` record directly inside `directory` (default: the
    /// store directory). Files are visited in name order.
    ///
    /// A missing directory loads nothing. Bad records are logged and skipped.
    pub fn load_all(&mut self, directory: Option<&Path>) -> LoadReport {
        let directory = directory.unwrap_or(self.directory.as_path()).to_path_buf();
        let mut report = LoadReport::default();
        if !directory.is_dir() {
            return report;
        }

        let walker = WalkDir::new(&directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_record(path) {
                continue;
            }
            match self.load_file(path) {
                Ok(template) => report.loaded.push(template.name),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping template record");
                    report.skipped.push(path.to_path_buf());
                }
            }
        }
        report
    }

    fn reindex(&mut self) {
        self.index = self
            .templates
            .iter()
            .enumerate()
            .map(|(pos, t)| (t.name.clone(), pos))
            .collect();
    }
}

fn is_record(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(RECORD_EXTENSION))
}
