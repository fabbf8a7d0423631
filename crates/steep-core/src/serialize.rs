//! Binary encodings for recipe batches and per-station brew state.
//!
//! Both payloads are `bitcode` behind a [`SnapshotHeader`] carrying a magic
//! number and a format version, validated before anything else is used.
//! Recipes cross the wire in their unresolved form and are re-resolved
//! against the receiving side's catalog.

use crate::catalog::{Catalog, ItemClass};
use crate::code::{AssetCode, CodeError};
use crate::ingredient::{IngredientCodes, IngredientSpec};
use crate::recipe::{OutputSpec, Recipe, RecipeTemplate};
use crate::registry::RecipeRegistry;
use crate::session::BrewState;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a recipe batch.
pub const RECIPE_BATCH_MAGIC: u32 = 0x57EE_0001;

/// Magic number identifying a brew state snapshot.
pub const BREW_STATE_MAGIC: u32 = 0x57EE_0002;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{expected:08X}, got 0x{found:08X}")]
    InvalidMagic { expected: u32, found: u32 },
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("payload from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("malformed code in payload: {0}")]
    Code(#[from] CodeError),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Header prepended to every payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
}

impl SnapshotHeader {
    pub fn new(magic: u32) -> Self {
        Self {
            magic,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self, expected_magic: u32) -> Result<(), DeserializeError> {
        if self.magic != expected_magic {
            return Err(DeserializeError::InvalidMagic {
                expected: expected_magic,
                found: self.magic,
            });
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Recipe wire format
// ---------------------------------------------------------------------------

/// Ingredient codes as plain strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireCodes {
    Single(String),
    AnyOf(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientWire {
    pub codes: WireCodes,
    pub quantity: i32,
    pub class: ItemClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputWire {
    pub code: String,
    pub class: ItemClass,
    /// Resolved raw stack size.
    pub quantity: i32,
    pub litres: f32,
}

/// One recipe on the wire. Field order is part of the format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeWire {
    pub code: String,
    pub ingredients: Vec<IngredientWire>,
    pub output: OutputWire,
    pub duration: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

impl From<&Recipe> for RecipeWire {
    fn from(recipe: &Recipe) -> Self {
        Self {
            code: recipe.code.clone(),
            ingredients: recipe
                .ingredients
                .iter()
                .map(|i| IngredientWire {
                    codes: match &i.spec.codes {
                        IngredientCodes::Single(code) => WireCodes::Single(code.to_string()),
                        IngredientCodes::AnyOf(codes) => {
                            WireCodes::AnyOf(codes.iter().map(ToString::to_string).collect())
                        }
                    },
                    quantity: i.spec.quantity as i32,
                    class: i.spec.class,
                })
                .collect(),
            output: OutputWire {
                code: recipe.output.spec.code.to_string(),
                class: recipe.output.spec.class,
                quantity: recipe.output.spec.quantity,
                litres: recipe.output.spec.litres,
            },
            duration: recipe.duration,
            min_temperature: recipe.min_temperature,
            max_temperature: recipe.max_temperature,
        }
    }
}

impl RecipeWire {
    /// Back to an unresolved template. Negative quantities clamp to zero,
    /// which resolution then rejects.
    pub fn to_template(&self) -> Result<RecipeTemplate, CodeError> {
        let ingredients = self
            .ingredients
            .iter()
            .map(|i| -> Result<IngredientSpec, CodeError> {
                let codes = match &i.codes {
                    WireCodes::Single(code) => IngredientCodes::Single(AssetCode::parse(code)?),
                    WireCodes::AnyOf(codes) => IngredientCodes::AnyOf(
                        codes
                            .iter()
                            .map(|c| AssetCode::parse(c))
                            .collect::<Result<_, _>>()?,
                    ),
                };
                Ok(IngredientSpec {
                    codes,
                    quantity: i.quantity.max(0) as u32,
                    class: i.class,
                    name: None,
                    allowed_variants: None,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RecipeTemplate {
            code: self.code.clone(),
            enabled: true,
            ingredients,
            output: OutputSpec {
                code: AssetCode::parse(&self.output.code)?,
                class: self.output.class,
                quantity: self.output.quantity,
                litres: self.output.litres,
            },
            duration: self.duration,
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RecipeBatch {
    header: SnapshotHeader,
    recipes: Vec<RecipeWire>,
}

/// Encode recipes in order.
pub fn encode_recipes<'a>(
    recipes: impl IntoIterator<Item = &'a Recipe>,
) -> Result<Vec<u8>, SerializeError> {
    let batch = RecipeBatch {
        header: SnapshotHeader::new(RECIPE_BATCH_MAGIC),
        recipes: recipes.into_iter().map(RecipeWire::from).collect(),
    };
    bitcode::serialize(&batch).map_err(|e| SerializeError::Encode(e.to_string()))
}

/// Decode a batch and resolve every recipe against `catalog`, preserving
/// order. Recipes that no longer resolve are skipped with a warning.
pub fn decode_recipes(data: &[u8], catalog: &Catalog) -> Result<Vec<Recipe>, DeserializeError> {
    let batch: RecipeBatch =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    batch.header.validate(RECIPE_BATCH_MAGIC)?;

    let mut recipes = Vec::with_capacity(batch.recipes.len());
    for wire in &batch.recipes {
        match wire.to_template()?.resolve(catalog) {
            Ok(recipe) => recipes.push(recipe),
            Err(e) => {
                tracing::warn!(recipe = %wire.code, error = %e, "received recipe could not be resolved")
            }
        }
    }
    Ok(recipes)
}

/// Replace `registry` with a decoded batch. Returns the number of recipes
/// now registered.
pub fn sync_registry(
    registry: &mut RecipeRegistry,
    data: &[u8],
    catalog: &Catalog,
) -> Result<usize, DeserializeError> {
    let recipes = decode_recipes(data, catalog)?;
    registry.sync_from(recipes);
    Ok(registry.len())
}

// ---------------------------------------------------------------------------
// Brew state
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct BrewSnapshot {
    header: SnapshotHeader,
    state: BrewState,
}

pub fn encode_brew_state(state: &BrewState) -> Result<Vec<u8>, SerializeError> {
    let snapshot = BrewSnapshot {
        header: SnapshotHeader::new(BREW_STATE_MAGIC),
        state: state.clone(),
    };
    bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
}

pub fn decode_brew_state(data: &[u8]) -> Result<BrewState, DeserializeError> {
    let snapshot: BrewSnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    snapshot.header.validate(BREW_STATE_MAGIC)?;
    Ok(snapshot.state)
}
