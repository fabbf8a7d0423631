//! Steep Core -- the brewing engine behind two-slot crafting stations.
//!
//! A station holds one solid ingredient and one liquid. Each update finds
//! the recipe its contents satisfy, credits brewing quality for the time
//! the liquid spent inside the recipe's temperature band, and once the
//! recipe's duration has elapsed over a heat source, consumes the
//! ingredients and produces the output with a shelf life derived from that
//! quality.
//!
//! # Load Pipeline
//!
//! Recipes are data. Each template goes through:
//!
//! 1. **Expand** -- wildcard ingredient codes are expanded against the
//!    [`catalog::Catalog`] into concrete templates ([`expand::expand`]).
//! 2. **Resolve** -- every code is looked up in the catalog
//!    ([`recipe::RecipeTemplate::resolve`]).
//! 3. **Register** -- resolved recipes are added to the
//!    [`registry::RecipeRegistry`]; the first recipe with a given code wins.
//!
//! # Update Cycle
//!
//! ```rust,ignore
//! let ctx = BrewContext::new(&registry, &catalog, &settings);
//! let mut station = Station::new(&settings);
//! station.try_insert(lily, &ctx);
//! station.try_insert(water, &ctx);
//! station.set_temperature(90.0, &settings);
//! let view = station.tick(now_hours, elapsed_seconds, &ctx);
//! ```
//!
//! # Key Types
//!
//! - [`code::AssetCode`] -- `domain:path` identifiers and wildcard patterns.
//! - [`ingredient::IngredientSpec`] -- What a recipe needs in one slot.
//! - [`recipe::Recipe`] -- A resolved recipe; immutable once registered.
//! - [`matcher::find_match`] -- First registered recipe the contents satisfy.
//! - [`session::BrewState`] -- Persisted per-station brew progress.
//! - [`station::Station`] / [`station::Brewery`] -- Containers and their owner.
//! - [`serialize`] -- Versioned bitcode encodings for recipes and brew state.

pub mod catalog;
pub mod code;
pub mod expand;
pub mod id;
pub mod ingredient;
pub mod item;
pub mod matcher;
pub mod recipe;
pub mod registry;
pub mod serialize;
pub mod session;
pub mod settings;
pub mod station;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
