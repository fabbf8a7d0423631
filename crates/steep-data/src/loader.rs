//! Load pipeline: reads data files, expands and resolves recipes, fills the
//! registry.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus the catalog, settings and recipe loaders
//! built on them.

use crate::schema::{CollectibleData, RecipeData};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use steep_core::catalog::{Catalog, CatalogBuilder, CatalogError};
use steep_core::expand::{Expansion, expand};
use steep_core::registry::RecipeRegistry;
use steep_core::settings::BrewSettings;

/// Base name of the required catalog file.
pub const CATALOG_FILE: &str = "catalog";
/// Base name of the optional settings file.
pub const SETTINGS_FILE: &str = "settings";
/// Subdirectory holding recipe documents.
pub const RECIPES_DIR: &str = "recipes";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Two catalog entries share a code.
    #[error("duplicate code '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

/// Every supported data file directly inside `dir`, sorted by path.
/// A missing directory yields no files.
pub fn data_files_in(dir: &Path) -> Result<Vec<PathBuf>, DataLoadError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && detect_format(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    match detect_format(path)? {
        Format::Toml => {
            let table: toml::Value = deserialize_file(path)?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
        _ => deserialize_file(path),
    }
}

/// One entry of a recipe document: the parsed recipe, or why it failed.
pub type RecipeEntry = Result<RecipeData, DataLoadError>;

/// Read one recipe asset. JSON and RON hold a recipe object or an array of
/// them; TOML holds either a `[[recipes]]` array or a single top-level recipe.
///
/// JSON and TOML entries are parsed one at a time, so a bad entry only
/// fails itself. A RON document parses as a whole.
pub fn read_recipe_document(path: &Path) -> Result<Vec<RecipeEntry>, DataLoadError> {
    match detect_format(path)? {
        Format::Json => {
            let items = match deserialize_file::<serde_json::Value>(path)? {
                serde_json::Value::Array(items) => items,
                single => vec![single],
            };
            Ok(items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(|e| parse_error(path, e)))
                .collect())
        }
        Format::Toml => {
            let table: toml::Value = deserialize_file(path)?;
            let listed = table.get("recipes").cloned();
            let items = match listed {
                Some(toml::Value::Array(items)) => items,
                Some(_) => return Err(parse_error(path, "'recipes' must be an array of tables")),
                None => vec![table],
            };
            Ok(items
                .into_iter()
                .map(|item| {
                    item.try_into()
                        .map_err(|e: toml::de::Error| parse_error(path, e))
                })
                .collect())
        }
        Format::Ron => {
            let content = std::fs::read_to_string(path)?;
            let recipes = match ron::from_str::<Vec<RecipeData>>(&content) {
                Ok(recipes) => recipes,
                Err(list_err) => match ron::from_str::<RecipeData>(&content) {
                    Ok(recipe) => vec![recipe],
                    Err(_) if content.trim_start().starts_with('[') => {
                        return Err(parse_error(path, list_err));
                    }
                    Err(e) => return Err(parse_error(path, e)),
                },
            };
            Ok(recipes.into_iter().map(Ok).collect())
        }
    }
}

// ===========================================================================
// Catalog and settings
// ===========================================================================

/// Load the catalog from a list file (`collectibles` key in TOML).
pub fn load_catalog(path: &Path) -> Result<Catalog, DataLoadError> {
    let entries: Vec<CollectibleData> = deserialize_list(path, "collectibles")?;
    let mut builder = CatalogBuilder::new();
    for entry in &entries {
        let def = entry.to_def().map_err(|e| parse_error(path, e))?;
        builder.register(def).map_err(|e| match e {
            CatalogError::Duplicate(code) => DataLoadError::DuplicateName {
                file: path.to_path_buf(),
                name: code.to_string(),
            },
            other => parse_error(path, other),
        })?;
    }
    Ok(builder.build())
}

/// Load brewing settings from `settings.{ron,toml,json}` in `dir`. Absent
/// file or fields fall back to defaults.
pub fn load_settings(dir: &Path) -> Result<BrewSettings, DataLoadError> {
    match find_data_file(dir, SETTINGS_FILE)? {
        Some(path) => deserialize_file(&path),
        None => Ok(BrewSettings::default()),
    }
}

// ===========================================================================
// Recipes
// ===========================================================================

/// What happened to each recipe entry during a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Concrete recipes added to the registry.
    pub registered: usize,
    /// Documents, entries or variants that failed to parse or resolve.
    pub ignored: usize,
    /// Templates dropped because a wildcard matched nothing.
    pub discarded: usize,
    /// Entries with `enabled: false`.
    pub disabled: usize,
    /// Resolved recipes whose code was already registered.
    pub duplicates: usize,
}

/// Expand, resolve and register every recipe in `files`, in order.
///
/// Nothing here aborts the load. A document that cannot be read, or an
/// entry that cannot be parsed, converted or resolved, is logged, counted
/// as ignored and skipped.
pub fn load_recipes(
    files: &[PathBuf],
    catalog: &Catalog,
    registry: &mut RecipeRegistry,
) -> LoadReport {
    let mut report = LoadReport::default();

    for path in files {
        let entries = match read_recipe_document(path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "recipe document could not be read");
                report.ignored += 1;
                continue;
            }
        };
        for entry in entries {
            let data = match entry {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(error = %e, "recipe entry could not be parsed");
                    report.ignored += 1;
                    continue;
                }
            };
            if !data.enabled {
                report.disabled += 1;
                continue;
            }
            let template = match data.to_template() {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(recipe = %data.code, file = %path.display(), error = %e, "invalid brewing recipe");
                    report.ignored += 1;
                    continue;
                }
            };

            let variants = match expand(&template, catalog) {
                Expansion::Discarded { .. } => {
                    report.discarded += 1;
                    continue;
                }
                expansion => expansion.into_templates(),
            };

            for variant in variants {
                match variant.resolve(catalog) {
                    Ok(recipe) => {
                        if registry.add(recipe) {
                            report.registered += 1;
                        } else {
                            report.duplicates += 1;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(recipe = %variant.code, error = %e, "brewing recipe could not be resolved");
                        report.ignored += 1;
                    }
                }
            }
        }
    }

    tracing::info!(
        "{} brewing recipes loaded ({} could not be resolved)",
        report.registered,
        report.ignored
    );
    report
}

// ===========================================================================
// Full data directory
// ===========================================================================

/// Everything a brewing world needs, loaded from one data directory.
#[derive(Debug)]
pub struct BrewData {
    pub catalog: Catalog,
    pub settings: BrewSettings,
    pub registry: RecipeRegistry,
    pub report: LoadReport,
}

/// Load `catalog.*` (required), `settings.*` (optional) and every recipe
/// document under `recipes/`.
pub fn load_brew_data(dir: &Path) -> Result<BrewData, DataLoadError> {
    let catalog = load_catalog(&require_data_file(dir, CATALOG_FILE)?)?;
    let settings = load_settings(dir)?;
    let files = data_files_in(&dir.join(RECIPES_DIR))?;

    let mut registry = RecipeRegistry::new();
    let report = load_recipes(&files, &catalog, &mut registry);

    Ok(BrewData {
        catalog,
        settings,
        registry,
        report,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
