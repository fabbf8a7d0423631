//! Recipe templates and their catalog-resolved form.
//!
//! A [`RecipeTemplate`] is what a data file describes: codes may still be
//! wildcards and the output may still carry `{name}` placeholders. Variant
//! expansion turns a template into concrete templates, and
//! [`RecipeTemplate::resolve`] turns each of those into an immutable
//! [`Recipe`] that the registry can hold.

use crate::catalog::{Catalog, ItemClass};
use crate::code::AssetCode;
use crate::id::CollectibleId;
use crate::ingredient::{Ingredient, IngredientSpec};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a template could not become a recipe.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("recipe has an empty code")]
    EmptyCode,
    #[error("recipe has no ingredients")]
    NoIngredients,
    #[error("ingredient {0} has a zero quantity")]
    ZeroQuantity(String),
    #[error("no catalog entry matches ingredient {0}")]
    UnresolvedIngredient(String),
    #[error("output {0} is not in the catalog")]
    UnresolvedOutput(AssetCode),
    #[error("output {0} yields nothing")]
    EmptyOutput(AssetCode),
    #[error("invalid duration {0}")]
    InvalidDuration(f64),
    #[error("temperature band {min}..{max} is inverted")]
    InvertedTemperatureBand { min: f64, max: f64 },
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Unresolved output as written in a recipe document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub code: AssetCode,
    pub class: ItemClass,
    /// Raw stack size. For liquids this is only a legacy fallback for
    /// `litres`.
    pub quantity: i32,
    /// Litres per batch for liquid outputs. Negative means unset.
    pub litres: f32,
}

impl OutputSpec {
    pub fn liquid(code: AssetCode, litres: f32) -> Self {
        Self {
            code,
            class: ItemClass::Item,
            quantity: 0,
            litres,
        }
    }

    pub fn solid(code: AssetCode, class: ItemClass, quantity: i32) -> Self {
        Self {
            code,
            class,
            quantity,
            litres: -1.0,
        }
    }

    fn resolve(&self, catalog: &Catalog, recipe_code: &str) -> Result<Output, ResolveError> {
        let (item, def) = catalog
            .by_code(&self.code)
            .filter(|(_, def)| def.class == self.class)
            .ok_or_else(|| ResolveError::UnresolvedOutput(self.code.clone()))?;

        let mut spec = self.clone();
        match def.items_per_litre() {
            Some(per_litre) => {
                if spec.litres < 0.0 {
                    if spec.quantity > 0 {
                        tracing::warn!(
                            recipe = recipe_code,
                            output = %self.code,
                            "output defines a stack size but no litres, assuming stack size = litres"
                        );
                        spec.litres = spec.quantity as f32;
                    } else {
                        spec.litres = 1.0;
                    }
                }
                spec.quantity = (per_litre * spec.litres) as i32;
                Ok(Output {
                    spec,
                    item,
                    items_per_litre: Some(per_litre),
                })
            }
            None => {
                if spec.quantity <= 0 {
                    return Err(ResolveError::EmptyOutput(self.code.clone()));
                }
                Ok(Output {
                    spec,
                    item,
                    items_per_litre: None,
                })
            }
        }
    }
}

/// A resolved output.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// The spec with litres filled in and `quantity` normalized to raw units.
    pub spec: OutputSpec,
    pub item: CollectibleId,
    pub items_per_litre: Option<f32>,
}

impl Output {
    /// Raw stack size produced for `outsize` batches.
    pub fn stack_size(&self, outsize: f64) -> u32 {
        let size = match self.items_per_litre {
            Some(per_litre) => self.spec.litres as f64 * per_litre as f64 * outsize,
            None => self.spec.quantity as f64 * outsize,
        };
        size.max(0.0) as u32
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A recipe as loaded, before expansion and resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeTemplate {
    pub code: String,
    pub enabled: bool,
    pub ingredients: Vec<IngredientSpec>,
    pub output: OutputSpec,
    /// Brewing time in real-time hours.
    pub duration: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

impl RecipeTemplate {
    /// Resolve every code against the catalog.
    pub fn resolve(&self, catalog: &Catalog) -> Result<Recipe, ResolveError> {
        if self.code.trim().is_empty() {
            return Err(ResolveError::EmptyCode);
        }
        if self.ingredients.is_empty() {
            return Err(ResolveError::NoIngredients);
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ResolveError::InvalidDuration(self.duration));
        }
        if self.min_temperature > self.max_temperature {
            return Err(ResolveError::InvertedTemperatureBand {
                min: self.min_temperature,
                max: self.max_temperature,
            });
        }

        let ingredients = self
            .ingredients
            .iter()
            .map(|spec| spec.resolve(catalog))
            .collect::<Result<Vec<_>, _>>()?;
        let output = self.output.resolve(catalog, &self.code)?;

        Ok(Recipe {
            code: self.code.clone(),
            ingredients,
            output,
            duration: self.duration,
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
        })
    }
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A resolved brewing recipe. Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub code: String,
    pub ingredients: Vec<Ingredient>,
    pub output: Output,
    pub duration: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

impl Recipe {
    /// 1.0 inside the band, falling linearly to 0.0 at `accuracy_ratio`
    /// degrees outside it on either side.
    pub fn temperature_match(&self, temperature: f64, accuracy_ratio: f64) -> f64 {
        let distance = (self.min_temperature - temperature).max(0.0)
            + (temperature - self.max_temperature).max(0.0);
        if distance <= 0.0 {
            return 1.0;
        }
        if accuracy_ratio <= 0.0 {
            return 0.0;
        }
        1.0 - (distance / accuracy_ratio).min(1.0)
    }

    /// Fraction of the output's freshness window already spent when it is
    /// produced with `quality` accumulated.
    pub fn decay_fraction(&self, quality: f64, min_quality: f64) -> f64 {
        let ratio = if self.duration > 0.0 {
            quality / self.duration
        } else {
            1.0
        };
        1.0 - ratio.clamp(min_quality, 1.0)
    }

    /// The unresolved form, used for wire encoding.
    pub fn template(&self) -> RecipeTemplate {
        RecipeTemplate {
            code: self.code.clone(),
            enabled: true,
            ingredients: self.ingredients.iter().map(|i| i.spec.clone()).collect(),
            output: self.output.spec.clone(),
            duration: self.duration,
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
        }
    }
}
