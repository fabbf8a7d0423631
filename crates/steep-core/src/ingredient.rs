//! Ingredient specifications and per-stack matching.

use crate::catalog::{Catalog, ItemClass};
use crate::code::{AssetCode, CodePattern};
use crate::id::CollectibleId;
use crate::item::ItemStack;
use crate::recipe::ResolveError;
use serde::{Deserialize, Serialize};

/// The code(s) an ingredient accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngredientCodes {
    /// One code or wildcard pattern.
    Single(AssetCode),
    /// Any of several codes or patterns, tried in order.
    AnyOf(Vec<AssetCode>),
}

impl IngredientCodes {
    pub fn codes(&self) -> &[AssetCode] {
        match self {
            IngredientCodes::Single(code) => std::slice::from_ref(code),
            IngredientCodes::AnyOf(codes) => codes,
        }
    }
}

/// An unresolved ingredient as written in a recipe document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSpec {
    pub codes: IngredientCodes,
    /// Required batches: stack count for solids, litres for liquids.
    pub quantity: u32,
    pub class: ItemClass,
    /// Wildcard dimension key used by variant expansion.
    pub name: Option<String>,
    /// Restricts the variants a wildcard may expand to.
    pub allowed_variants: Option<Vec<String>>,
}

impl IngredientSpec {
    pub fn single(code: AssetCode, quantity: u32, class: ItemClass) -> Self {
        Self {
            codes: IngredientCodes::Single(code),
            quantity,
            class,
            name: None,
            allowed_variants: None,
        }
    }

    pub fn any_of(codes: Vec<AssetCode>, quantity: u32, class: ItemClass) -> Self {
        Self {
            codes: IngredientCodes::AnyOf(codes),
            quantity,
            class,
            name: None,
            allowed_variants: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_allowed_variants(mut self, variants: Vec<String>) -> Self {
        self.allowed_variants = Some(variants);
        self
    }

    /// Resolve against the catalog. A single code must match at least one
    /// entry of the ingredient's class; an alternatives list needs at least
    /// one alternative that does. The first hit becomes the representative.
    pub fn resolve(&self, catalog: &Catalog) -> Result<Ingredient, ResolveError> {
        if self.quantity == 0 {
            return Err(ResolveError::ZeroQuantity(self.describe()));
        }
        let patterns: Vec<CodePattern> =
            self.codes.codes().iter().map(AssetCode::to_pattern).collect();
        let representative = patterns
            .iter()
            .find_map(|p| catalog.first_match(p, self.class))
            .ok_or_else(|| ResolveError::UnresolvedIngredient(self.describe()))?;
        let liquid = catalog.get(representative).is_some_and(|def| def.is_liquid());

        Ok(Ingredient {
            spec: self.clone(),
            patterns,
            representative,
            liquid,
        })
    }

    fn describe(&self) -> String {
        let codes: Vec<String> = self.codes.codes().iter().map(ToString::to_string).collect();
        format!("[{}]", codes.join(", "))
    }
}

/// A resolved ingredient with its patterns compiled for matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub spec: IngredientSpec,
    patterns: Vec<CodePattern>,
    /// A catalog entry satisfying this ingredient, for display.
    pub representative: CollectibleId,
    /// Whether the representative is a liquid.
    pub liquid: bool,
}

impl Ingredient {
    pub fn quantity(&self) -> u32 {
        self.spec.quantity
    }

    /// Does `stack` satisfy this ingredient, and for how many full batches?
    ///
    /// Liquids are converted to litres before dividing by the required
    /// quantity; solids use their raw count. Returns `None` for an empty
    /// slot, an entry missing from the catalog, a liquid with a non-positive
    /// conversion factor, or a code mismatch.
    pub fn match_stack(&self, stack: Option<&ItemStack>, catalog: &Catalog) -> Option<f64> {
        let stack = stack.filter(|s| !s.is_empty())?;
        let def = catalog.get(stack.item)?;

        let mut quantity = stack.quantity as f64;
        if let Some(per_litre) = def.items_per_litre() {
            if per_litre <= 0.0 {
                return None;
            }
            quantity /= per_litre as f64;
        }

        if !self.patterns.iter().any(|p| p.matches(&def.code)) {
            return None;
        }
        Some(quantity / self.spec.quantity.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;

    fn code(s: &str) -> AssetCode {
        AssetCode::parse(s).unwrap()
    }

    struct Fixture {
        catalog: Catalog,
        lily: CollectibleId,
        rose: CollectibleId,
        water: CollectibleId,
        broken: CollectibleId,
    }

    fn fixture() -> Fixture {
        let mut b = CatalogBuilder::new();
        let lily = b.register_block(code("flower-lily")).unwrap();
        let rose = b.register_block(code("flower-rose")).unwrap();
        let water = b.register_liquid(code("waterportion"), 100.0, None).unwrap();
        let broken = b.register_liquid(code("brokenportion"), 0.0, None).unwrap();
        Fixture {
            catalog: b.build(),
            lily,
            rose,
            water,
            broken,
        }
    }

    #[test]
    fn solid_uses_raw_count() {
        let f = fixture();
        let ing = IngredientSpec::single(code("flower-lily"), 2, ItemClass::Block)
            .resolve(&f.catalog)
            .unwrap();
        let stack = ItemStack::new(f.lily, 4);
        assert_eq!(ing.match_stack(Some(&stack), &f.catalog), Some(2.0));
    }

    #[test]
    fn liquid_converts_to_litres() {
        let f = fixture();
        let ing = IngredientSpec::single(code("waterportion"), 1, ItemClass::Item)
            .resolve(&f.catalog)
            .unwrap();
        assert!(ing.liquid);
        let stack = ItemStack::new(f.water, 150);
        assert_eq!(ing.match_stack(Some(&stack), &f.catalog), Some(1.5));
    }

    #[test]
    fn non_positive_factor_never_matches() {
        let f = fixture();
        let ing = IngredientSpec::single(code("brokenportion"), 1, ItemClass::Item)
            .resolve(&f.catalog)
            .unwrap();
        let stack = ItemStack::new(f.broken, 100);
        assert_eq!(ing.match_stack(Some(&stack), &f.catalog), None);
    }

    #[test]
    fn empty_or_unknown_stacks_fail() {
        let f = fixture();
        let ing = IngredientSpec::single(code("flower-*"), 1, ItemClass::Block)
            .resolve(&f.catalog)
            .unwrap();
        assert_eq!(ing.match_stack(None, &f.catalog), None);
        let empty = ItemStack::new(f.lily, 0);
        assert_eq!(ing.match_stack(Some(&empty), &f.catalog), None);
        let unknown = ItemStack::new(CollectibleId(99), 1);
        assert_eq!(ing.match_stack(Some(&unknown), &f.catalog), None);
    }

    #[test]
    fn any_of_matches_each_alternative() {
        let f = fixture();
        let ing = IngredientSpec::any_of(
            vec![code("flower-rose"), code("flower-lily")],
            1,
            ItemClass::Block,
        )
        .resolve(&f.catalog)
        .unwrap();
        assert_eq!(ing.representative, f.rose);
        assert!(ing.match_stack(Some(&ItemStack::new(f.lily, 1)), &f.catalog).is_some());
        assert!(ing.match_stack(Some(&ItemStack::new(f.rose, 1)), &f.catalog).is_some());
        assert!(ing.match_stack(Some(&ItemStack::new(f.water, 100)), &f.catalog).is_none());
    }

    #[test]
    fn wrong_code_fails() {
        let f = fixture();
        let ing = IngredientSpec::single(code("flower-rose"), 1, ItemClass::Block)
            .resolve(&f.catalog)
            .unwrap();
        assert_eq!(ing.match_stack(Some(&ItemStack::new(f.lily, 1)), &f.catalog), None);
    }

    #[test]
    fn resolve_fails_without_catalog_hit() {
        let f = fixture();
        let err = IngredientSpec::single(code("herb-mint"), 1, ItemClass::Block)
            .resolve(&f.catalog)
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvedIngredient(_)));

        // Right code, wrong class.
        let err = IngredientSpec::single(code("flower-lily"), 1, ItemClass::Item)
            .resolve(&f.catalog)
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvedIngredient(_)));
    }

    #[test]
    fn resolve_any_of_needs_one_hit() {
        let f = fixture();
        let ing = IngredientSpec::any_of(
            vec![code("herb-mint"), code("flower-lily")],
            1,
            ItemClass::Block,
        )
        .resolve(&f.catalog)
        .unwrap();
        assert_eq!(ing.representative, f.lily);
        assert!(!ing.liquid);

        let empty = IngredientSpec::any_of(vec![], 1, ItemClass::Block).resolve(&f.catalog);
        assert!(matches!(empty, Err(ResolveError::UnresolvedIngredient(_))));
    }

    #[test]
    fn zero_quantity_rejected() {
        let f = fixture();
        let err = IngredientSpec::single(code("flower-lily"), 0, ItemClass::Block)
            .resolve(&f.catalog)
            .unwrap_err();
        assert!(matches!(err, ResolveError::ZeroQuantity(_)));
    }
}
