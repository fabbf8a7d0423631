//! Shared test helpers for unit tests, integration tests and downstream
//! crates (via the `test-utils` feature).

use crate::catalog::{Catalog, CatalogBuilder, ItemClass};
use crate::code::AssetCode;
use crate::id::CollectibleId;
use crate::ingredient::IngredientSpec;
use crate::item::{Contents, ItemStack};
use crate::recipe::{OutputSpec, RecipeTemplate};
use crate::registry::RecipeRegistry;

/// Raw liquid units per litre used by every fixture liquid.
pub const UNITS_PER_LITRE: f32 = 100.0;

/// Freshness window of fixture teas, in hours.
pub const TEA_PERISH_HOURS: f32 = 48.0;

pub fn code(s: &str) -> AssetCode {
    AssetCode::parse(s).unwrap()
}

// ===========================================================================
// Catalog fixture
// ===========================================================================

pub struct TeaFixture {
    pub catalog: Catalog,
    pub lily: CollectibleId,
    pub rose: CollectibleId,
    pub mint: CollectibleId,
    pub water: CollectibleId,
    pub milk: CollectibleId,
    pub lily_tea: CollectibleId,
    pub rose_tea: CollectibleId,
    pub dried: CollectibleId,
}

/// Two flower blocks, a herb block, water, milk, two teas and a dried item.
pub fn tea_fixture() -> TeaFixture {
    let mut b = CatalogBuilder::new();
    let lily = b.register_block(code("flower-lily")).unwrap();
    let rose = b.register_block(code("flower-rose")).unwrap();
    let mint = b.register_block(code("herb-mint")).unwrap();
    let water = b
        .register_liquid(code("waterportion"), UNITS_PER_LITRE, None)
        .unwrap();
    let milk = b
        .register_liquid(code("milkportion"), UNITS_PER_LITRE, Some(24.0))
        .unwrap();
    let lily_tea = b
        .register_liquid(
            code("maketea:teaportion-lily"),
            UNITS_PER_LITRE,
            Some(TEA_PERISH_HOURS),
        )
        .unwrap();
    let rose_tea = b
        .register_liquid(
            code("maketea:teaportion-rose"),
            UNITS_PER_LITRE,
            Some(TEA_PERISH_HOURS),
        )
        .unwrap();
    let dried = b.register_item(code("flower-dried")).unwrap();

    TeaFixture {
        catalog: b.build(),
        lily,
        rose,
        mint,
        water,
        milk,
        lily_tea,
        rose_tea,
        dried,
    }
}

// ===========================================================================
// Recipe templates
// ===========================================================================

/// One lily + one litre of water, 80..100 degrees, two hours, one litre of
/// lily tea.
pub fn lily_tea_template() -> RecipeTemplate {
    tea_template("lily-tea", "flower-lily", "maketea:teaportion-lily")
}

/// Like [`lily_tea_template`] but for roses.
pub fn rose_tea_template() -> RecipeTemplate {
    tea_template("rose-tea", "flower-rose", "maketea:teaportion-rose")
}

pub fn tea_template(recipe_code: &str, flower: &str, output: &str) -> RecipeTemplate {
    RecipeTemplate {
        code: recipe_code.to_string(),
        enabled: true,
        ingredients: vec![
            IngredientSpec::single(code(flower), 1, ItemClass::Block),
            IngredientSpec::single(code("waterportion"), 1, ItemClass::Item),
        ],
        output: OutputSpec::liquid(code(output), 1.0),
        duration: 2.0,
        min_temperature: 80.0,
        max_temperature: 100.0,
    }
}

/// `flower-*` expanded per flower into `maketea:teaportion-{flower}`.
pub fn wildcard_tea_template() -> RecipeTemplate {
    RecipeTemplate {
        code: "tea-{flower}".to_string(),
        enabled: true,
        ingredients: vec![
            IngredientSpec::single(code("flower-*"), 1, ItemClass::Block).named("flower"),
            IngredientSpec::single(code("waterportion"), 1, ItemClass::Item),
        ],
        output: OutputSpec::liquid(code("maketea:teaportion-{flower}"), 1.0),
        duration: 2.0,
        min_temperature: 80.0,
        max_temperature: 100.0,
    }
}

/// Resolve and register each template in order.
pub fn registry_with(catalog: &Catalog, templates: &[RecipeTemplate]) -> RecipeRegistry {
    let mut registry = RecipeRegistry::new();
    for t in templates {
        registry.add(t.resolve(catalog).unwrap());
    }
    registry
}

// ===========================================================================
// Stacks
// ===========================================================================

pub fn stack(item: CollectibleId, quantity: u32) -> ItemStack {
    ItemStack::new(item, quantity)
}

pub fn litres(item: CollectibleId, litres: f32) -> ItemStack {
    ItemStack::new(item, (litres * UNITS_PER_LITRE) as u32)
}

pub fn contents(solid: Option<ItemStack>, liquid: Option<ItemStack>) -> Contents {
    [solid, liquid]
}
