//! Finding the recipe a station's contents satisfy.

use crate::catalog::Catalog;
use crate::item::{Contents, LIQUID_SLOT, SLOT_COUNT, SOLID_SLOT};
use crate::recipe::Recipe;
use crate::registry::RecipeRegistry;

/// Slot orderings tried for two-ingredient recipes, in order.
const PAIR_ORDERINGS: [[usize; 2]; 2] = [[SOLID_SLOT, LIQUID_SLOT], [LIQUID_SLOT, SOLID_SLOT]];

/// A recipe the contents satisfy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeMatch<'a> {
    pub recipe: &'a Recipe,
    /// Batches the contents are enough for. Always positive.
    pub outsize: f64,
    /// `slots[i]` is the content slot that satisfied ingredient `i`.
    pub slots: [usize; SLOT_COUNT],
}

/// The first recipe in registration order that `contents` satisfy.
pub fn find_match<'a>(
    contents: &Contents,
    registry: &'a RecipeRegistry,
    catalog: &Catalog,
    tolerance: f64,
) -> Option<RecipeMatch<'a>> {
    registry
        .iter()
        .find_map(|recipe| match_recipe(recipe, contents, catalog, tolerance))
}

/// Match one recipe against the contents.
///
/// Two-ingredient recipes accept either slot order. Any other ingredient
/// count is matched positionally. Every ingredient must be satisfied for the
/// same number of batches, within `tolerance`.
pub fn match_recipe<'a>(
    recipe: &'a Recipe,
    contents: &Contents,
    catalog: &Catalog,
    tolerance: f64,
) -> Option<RecipeMatch<'a>> {
    let count = recipe.ingredients.len();
    if count == 0 || count > SLOT_COUNT {
        return None;
    }

    if count == 2 {
        return PAIR_ORDERINGS
            .iter()
            .find_map(|order| match_ordering(recipe, contents, catalog, tolerance, order));
    }

    let positional: Vec<usize> = (0..count).collect();
    match_ordering(recipe, contents, catalog, tolerance, &positional)
}

fn match_ordering<'a>(
    recipe: &'a Recipe,
    contents: &Contents,
    catalog: &Catalog,
    tolerance: f64,
    order: &[usize],
) -> Option<RecipeMatch<'a>> {
    let mut outsize: Option<f64> = None;
    let mut slots = [SOLID_SLOT, LIQUID_SLOT];

    for (i, (ingredient, &slot)) in recipe.ingredients.iter().zip(order).enumerate() {
        let normalized = ingredient.match_stack(contents[slot].as_ref(), catalog)?;
        match outsize {
            None => outsize = Some(normalized),
            Some(first) if (first - normalized).abs() > tolerance => return None,
            Some(_) => {}
        }
        slots[i] = slot;
    }

    let outsize = outsize.filter(|o| *o > 0.0)?;
    Some(RecipeMatch {
        recipe,
        outsize,
        slots,
    })
}
