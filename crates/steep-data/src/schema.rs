//! Serde data file structs for brewing content.
//!
//! These structs define the on-disk format for catalog entries and recipe
//! documents. They are deserialized from RON, JSON, or
//! TOML data files and then converted into engine types by the loader.

use serde::Deserialize;
use steep_core::catalog::{CollectibleDef, ItemClass, LiquidProps};
use steep_core::code::{AssetCode, CodeError};
use steep_core::ingredient::{IngredientCodes, IngredientSpec};
use steep_core::recipe::{OutputSpec, RecipeTemplate};

/// Why a well-formed document could not become an engine type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error(transparent)]
    Code(#[from] CodeError),
    #[error("ingredient has neither `code` nor `codes`")]
    MissingCode,
}

// ===========================================================================
// Catalog
// ===========================================================================

/// One catalog entry in a data file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectibleData {
    pub code: String,
    #[serde(rename = "type", default)]
    pub class: ItemClass,
    /// Present for liquids.
    #[serde(default)]
    pub items_per_litre: Option<f32>,
    #[serde(default)]
    pub perish_hours: Option<f32>,
}

impl CollectibleData {
    pub fn to_def(&self) -> Result<CollectibleDef, SchemaError> {
        Ok(CollectibleDef {
            code: AssetCode::parse(&self.code)?,
            class: self.class,
            liquid: self
                .items_per_litre
                .map(|items_per_litre| LiquidProps { items_per_litre }),
            perish_hours: self.perish_hours,
        })
    }
}

// ===========================================================================
// Recipes
// ===========================================================================

fn default_true() -> bool {
    true
}

fn default_quantity() -> u32 {
    1
}

fn unset_litres() -> f32 {
    -1.0
}

/// A recipe definition in a data file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeData {
    pub code: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub ingredients: Vec<IngredientData>,
    pub output: OutputData,
    /// Real-time hours.
    pub duration: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

/// An ingredient: a single `code` (may be a wildcard) or a list of
/// alternative `codes`. `codes` wins when both are present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientData {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub codes: Option<Vec<String>>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(rename = "type", default)]
    pub class: ItemClass,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub allowed_variants: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputData {
    pub code: String,
    #[serde(rename = "type", default)]
    pub class: ItemClass,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default = "unset_litres")]
    pub litres: f32,
}

impl IngredientData {
    pub fn to_spec(&self) -> Result<IngredientSpec, SchemaError> {
        let codes = match (&self.codes, &self.code) {
            (Some(codes), _) if !codes.is_empty() => IngredientCodes::AnyOf(
                codes
                    .iter()
                    .filter(|c| !c.trim().is_empty())
                    .map(|c| AssetCode::parse(c))
                    .collect::<Result<_, _>>()?,
            ),
            (_, Some(code)) => IngredientCodes::Single(AssetCode::parse(code)?),
            (Some(_), None) => IngredientCodes::AnyOf(Vec::new()),
            (None, None) => return Err(SchemaError::MissingCode),
        };
        Ok(IngredientSpec {
            codes,
            quantity: self.quantity,
            class: self.class,
            name: self.name.clone(),
            allowed_variants: self.allowed_variants.clone(),
        })
    }
}

impl RecipeData {
    pub fn to_template(&self) -> Result<RecipeTemplate, SchemaError> {
        let ingredients = self
            .ingredients
            .iter()
            .map(IngredientData::to_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RecipeTemplate {
            code: self.code.clone(),
            enabled: self.enabled,
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

#[cfg(test)]
mod tests {
    use super::*;

    const LILY_TEA: &str = r#"{
        "code": "lily-tea",
        "ingredients": [
            { "type": "block", "code": "flower-lily" },
            { "type": "item", "code": "waterportion", "quantity": 1 }
        ],
        "output": { "type": "item", "code": "maketea:teaportion-lily", "litres": 1 },
        "duration": 2,
        "minTemperature": 80,
        "maxTemperature": 100
    }"#;

    fn lily_tea() -> RecipeData {
        serde_json::from_str(LILY_TEA).unwrap()
    }

    #[test]
    fn recipe_defaults() {
        let r = lily_tea();
        assert!(r.enabled);
        assert_eq!(r.ingredients[0].class, ItemClass::Block);
        assert_eq!(r.ingredients[0].quantity, 1);
        assert_eq!(r.output.litres, 1.0);
    }

    #[test]
    fn recipe_list() {
        let recipes: Vec<RecipeData> =
            serde_json::from_str(&format!("[{LILY_TEA}, {LILY_TEA}]")).unwrap();
        assert_eq!(recipes.len(), 2);
    }

    #[test]
    fn missing_field_is_named() {
        let err = serde_json::from_str::<RecipeData>(&LILY_TEA.replace("\"duration\": 2,", ""))
            .unwrap_err();
        assert!(err.to_string().contains("duration"), "{err}");
    }

    #[test]
    fn template_conversion() {
        let t = lily_tea().to_template().unwrap();
        assert_eq!(t.code, "lily-tea");
        assert_eq!(t.min_temperature, 80.0);
        assert_eq!(t.output.code.to_string(), "maketea:teaportion-lily");
        assert_eq!(
            t.ingredients[0].codes,
            IngredientCodes::Single(AssetCode::parse("flower-lily").unwrap())
        );
    }

    #[test]
    fn output_litres_default_unset() {
        let o: OutputData = serde_json::from_str(r#"{ "code": "flower-dried", "quantity": 2 }"#).unwrap();
        assert_eq!(o.litres, -1.0);
        assert_eq!(o.class, ItemClass::Item);
    }

    #[test]
    fn codes_list_skips_blanks() {
        let i: IngredientData =
            serde_json::from_str(r#"{ "codes": ["flower-lily", " ", "flower-rose"], "type": "block" }"#)
                .unwrap();
        match i.to_spec().unwrap().codes {
            IngredientCodes::AnyOf(codes) => assert_eq!(codes.len(), 2),
            other => panic!("expected AnyOf, got {other:?}"),
        }
    }

    #[test]
    fn codes_win_over_code() {
        let i: IngredientData = serde_json::from_str(
            r#"{ "code": "flower-lily", "codes": ["flower-rose"], "type": "block" }"#,
        )
        .unwrap();
        assert!(matches!(i.to_spec().unwrap().codes, IngredientCodes::AnyOf(_)));
    }

    #[test]
    fn ingredient_without_code_rejected() {
        let i: IngredientData = serde_json::from_str(r#"{ "quantity": 1 }"#).unwrap();
        assert_eq!(i.to_spec().unwrap_err(), SchemaError::MissingCode);
    }

    #[test]
    fn malformed_code_rejected() {
        let i: IngredientData = serde_json::from_str(r#"{ "code": "a:b:c" }"#).unwrap();
        assert!(matches!(i.to_spec(), Err(SchemaError::Code(_))));
    }

    #[test]
    fn collectible_conversion() {
        let c: CollectibleData = serde_json::from_str(
            r#"{ "code": "waterportion", "itemsPerLitre": 100, "perishHours": 12 }"#,
        )
        .unwrap();
        let def = c.to_def().unwrap();
        assert!(def.is_liquid());
        assert_eq!(def.items_per_litre(), Some(100.0));
        assert_eq!(def.perish_hours, Some(12.0));
        assert_eq!(def.class, ItemClass::Item);
    }
}
