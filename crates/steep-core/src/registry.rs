use crate::code::{AssetCode, CodePattern};
use crate::id::RecipeId;
use crate::recipe::Recipe;
use std::collections::HashMap;

/// Resolved brewing recipes in registration order, indexed by code.
///
/// Lifecycle: load, populate, query, then [`clear`](Self::clear) before the
/// next asset set. Stations share the registry by reference; nothing mutates
/// a recipe once it has been added.
#[derive(Debug, Default)]
pub struct RecipeRegistry {
    recipes: Vec<Recipe>,
    code_to_id: HashMap<String, RecipeId>,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recipe. Returns `false` (and drops the recipe) if its code is
    /// empty or already registered.
    pub fn add(&mut self, recipe: Recipe) -> bool {
        if recipe.code.is_empty() {
            return false;
        }
        if self.code_to_id.contains_key(&recipe.code) {
            tracing::debug!(recipe = %recipe.code, "duplicate recipe code ignored");
            return false;
        }
        let id = RecipeId(self.recipes.len() as u32);
        self.code_to_id.insert(recipe.code.clone(), id);
        self.recipes.push(recipe);
        true
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.get(id.0 as usize)
    }

    pub fn id(&self, code: &str) -> Option<RecipeId> {
        self.code_to_id.get(code).copied()
    }

    pub fn get_by_code(&self, code: &str) -> Option<&Recipe> {
        self.id(code).and_then(|id| self.get(id))
    }

    /// Recipes in registration order. This is the order matching tries them.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn clear(&mut self) {
        self.recipes.clear();
        self.code_to_id.clear();
    }

    /// Replace the contents with an authoritative batch. The index is rebuilt
    /// from the ordered list; the first occurrence of a duplicate code wins.
    pub fn sync_from(&mut self, recipes: impl IntoIterator<Item = Recipe>) {
        self.clear();
        for recipe in recipes {
            self.add(recipe);
        }
    }

    /// Code patterns of every solid ingredient, deduplicated in first-use
    /// order. Stations use this to decide what their solid slot accepts.
    pub fn ingredient_codes(&self) -> Vec<CodePattern> {
        let mut seen: Vec<&AssetCode> = Vec::new();
        let solids = self
            .recipes
            .iter()
            .flat_map(|r| r.ingredients.iter())
            .filter(|i| !i.liquid);
        for ingredient in solids {
            for code in ingredient.spec.codes.codes() {
                if !seen.contains(&code) {
                    seen.push(code);
                }
            }
        }
        seen.into_iter().map(AssetCode::to_pattern).collect()
    }
}
