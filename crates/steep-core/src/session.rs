//! Per-station brewing state machine.
//!
//! A [`BrewState`] is plain data: the recipe currently being brewed, when it
//! started, the quality accumulated so far and when quality was last
//! credited. [`BrewState::update`] is the authoritative write path;
//! [`BrewState::probe`] computes the same [`BrewView`] without touching the
//! state or the contents.
//!
//! Times are real-time hours. Quality is measured in hours of in-band
//! brewing and is bounded by the recipe duration, so a full uninterrupted
//! brew inside the temperature band ends with `quality == duration`.

use crate::catalog::Catalog;
use crate::item::{drain_slot, Contents, ItemStack, LIQUID_SLOT, SOLID_SLOT};
use crate::matcher::{find_match, RecipeMatch};
use crate::recipe::Recipe;
use crate::registry::RecipeRegistry;
use crate::settings::BrewSettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const KEY_RECIPE: &str = "currentRecipeCode";
const KEY_START: &str = "craftingStartHours";
const KEY_QUALITY: &str = "craftingQuality";
const KEY_LAST_UPDATE: &str = "lastUpdateHours";

/// Shared, read-only inputs every update needs.
#[derive(Debug, Clone, Copy)]
pub struct BrewContext<'a> {
    pub registry: &'a RecipeRegistry,
    pub catalog: &'a Catalog,
    pub settings: &'a BrewSettings,
}

impl<'a> BrewContext<'a> {
    pub fn new(
        registry: &'a RecipeRegistry,
        catalog: &'a Catalog,
        settings: &'a BrewSettings,
    ) -> Self {
        Self {
            registry,
            catalog,
            settings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrewPhase {
    /// The contents match no recipe.
    Inactive,
    Brewing,
    /// The update that produced this view finished a craft.
    Brewed,
}

/// What a station reports about its brew after an update or probe.
#[derive(Debug, Clone, PartialEq)]
pub struct BrewView {
    pub phase: BrewPhase,
    pub recipe_code: Option<String>,
    /// Hours brewed so far, clamped to `[0, total_duration]`.
    pub crafting_duration: f64,
    pub total_duration: f64,
    pub temperature_match: f64,
    pub quality: f64,
}

impl BrewView {
    pub fn inactive() -> Self {
        Self {
            phase: BrewPhase::Inactive,
            recipe_code: None,
            crafting_duration: 0.0,
            total_duration: 1.0,
            temperature_match: 0.0,
            quality: 0.0,
        }
    }

    /// `crafting_duration / total_duration`, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_duration > 0.0 {
            (self.crafting_duration / self.total_duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Persisted brewing state of one station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrewState {
    pub recipe_code: Option<String>,
    pub crafting_start: f64,
    pub quality: f64,
    pub last_update: Option<f64>,
}

/// The outcome of evaluating one update, before anything is written.
struct Step<'a> {
    matched: RecipeMatch<'a>,
    next: BrewState,
    crafting_duration: f64,
    temperature_match: f64,
    finalize: bool,
}

impl<'a> Step<'a> {
    fn view(&self, phase: BrewPhase) -> BrewView {
        let recipe = self.matched.recipe;
        BrewView {
            phase,
            recipe_code: Some(recipe.code.clone()),
            crafting_duration: self.crafting_duration,
            total_duration: recipe.duration,
            temperature_match: self.temperature_match,
            quality: self.next.quality,
        }
    }
}

impl BrewState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.recipe_code.is_some()
    }

    /// The stored recipe, looked up in `registry`.
    pub fn recipe<'a>(&self, registry: &'a RecipeRegistry) -> Option<&'a Recipe> {
        self.recipe_code
            .as_deref()
            .and_then(|code| registry.get_by_code(code))
    }

    /// Authoritative update. May consume ingredients and place the output in
    /// `contents` when the brew finishes.
    pub fn update(
        &mut self,
        now: f64,
        contents: &mut Contents,
        temperature: f64,
        ctx: &BrewContext<'_>,
    ) -> BrewView {
        let Some(step) = self.evaluate(now, contents, temperature, ctx) else {
            self.clear();
            return BrewView::inactive();
        };

        if step.finalize {
            finish(&step.matched, step.next.quality, contents, ctx);
            tracing::debug!(
                recipe = %step.matched.recipe.code,
                outsize = step.matched.outsize,
                quality = step.next.quality,
                "brew finished"
            );
            let view = step.view(BrewPhase::Brewed);
            self.clear();
            return view;
        }

        let view = step.view(BrewPhase::Brewing);
        *self = step.next;
        view
    }

    /// Read-only view of what [`update`](Self::update) would report.
    pub fn probe(
        &self,
        now: f64,
        contents: &Contents,
        temperature: f64,
        ctx: &BrewContext<'_>,
    ) -> BrewView {
        match self.evaluate(now, contents, temperature, ctx) {
            Some(step) if step.finalize => step.view(BrewPhase::Brewed),
            Some(step) => step.view(BrewPhase::Brewing),
            None => BrewView::inactive(),
        }
    }

    fn evaluate<'a>(
        &self,
        now: f64,
        contents: &Contents,
        temperature: f64,
        ctx: &BrewContext<'a>,
    ) -> Option<Step<'a>> {
        let settings = ctx.settings;
        let matched = find_match(
            contents,
            ctx.registry,
            ctx.catalog,
            settings.quantity_tolerance,
        )?;
        let recipe = matched.recipe;

        let mut next = self.clone();
        if next.recipe_code.as_deref() != Some(recipe.code.as_str()) {
            next = BrewState {
                recipe_code: Some(recipe.code.clone()),
                crafting_start: now,
                quality: 0.0,
                last_update: Some(now),
            };
        }

        let duration = recipe.duration;
        let crafting_duration = (now - next.crafting_start).max(0.0).min(duration);

        // Only the part of [last_update, now] inside the brew window counts.
        let window_end = next.crafting_start + duration;
        let dt = match next.last_update {
            Some(last) => (now.min(window_end) - last.max(next.crafting_start)).max(0.0),
            None => 0.0,
        };

        let temperature_match = recipe.temperature_match(temperature, settings.accuracy_ratio);
        next.quality = (next.quality + temperature_match * dt).max(0.0).min(duration);
        // A clock that steps backwards must not reopen time already credited.
        next.last_update = Some(next.last_update.map_or(now, |last| last.max(now)));

        let finalize = crafting_duration >= duration && temperature > settings.room_temperature;

        Some(Step {
            matched,
            next,
            crafting_duration,
            temperature_match,
            finalize,
        })
    }

    // -----------------------------------------------------------------------
    // Attribute tree
    // -----------------------------------------------------------------------

    /// Encode as a flat attribute map.
    pub fn to_tree(&self) -> Map<String, Value> {
        let mut tree = Map::new();
        if let Some(code) = &self.recipe_code {
            tree.insert(KEY_RECIPE.to_string(), Value::from(code.as_str()));
        }
        tree.insert(KEY_START.to_string(), Value::from(self.crafting_start));
        tree.insert(KEY_QUALITY.to_string(), Value::from(self.quality));
        if let Some(last) = self.last_update {
            tree.insert(KEY_LAST_UPDATE.to_string(), Value::from(last));
        }
        tree
    }

    /// Decode an attribute map. Missing or malformed fields fall back to
    /// their defaults; a missing recipe leaves the state inactive.
    pub fn from_tree(tree: &Map<String, Value>) -> Self {
        let number = |key: &str| {
            tree.get(key)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite())
        };
        Self {
            recipe_code: tree
                .get(KEY_RECIPE)
                .and_then(Value::as_str)
                .filter(|code| !code.is_empty())
                .map(str::to_string),
            crafting_start: number(KEY_START).unwrap_or(0.0),
            quality: number(KEY_QUALITY).unwrap_or(0.0).max(0.0),
            last_update: number(KEY_LAST_UPDATE),
        }
    }
}

/// Consume the matched ingredients and place the output.
fn finish(matched: &RecipeMatch<'_>, quality: f64, contents: &mut Contents, ctx: &BrewContext<'_>) {
    let recipe = matched.recipe;

    for (i, ingredient) in recipe.ingredients.iter().enumerate() {
        let slot = matched.slots[i];
        let Some(stack) = contents[slot].as_ref() else {
            continue;
        };
        let mut per_batch = ingredient.quantity() as f64;
        if let Some(per_litre) = ctx.catalog.get(stack.item).and_then(|d| d.items_per_litre()) {
            per_batch = (per_litre as f64 * per_batch).trunc();
        }
        drain_slot(&mut contents[slot], batch_units(per_batch, matched.outsize));
    }

    let decay = recipe.decay_fraction(quality, ctx.settings.min_quality);
    let perish_hours = ctx
        .catalog
        .get(recipe.output.item)
        .and_then(|d| d.perish_hours)
        .unwrap_or(0.0);
    let mut output = ItemStack::new(recipe.output.item, recipe.output.stack_size(matched.outsize));
    output.transitioned_hours = (decay * perish_hours as f64) as f32;

    let slot = if recipe.output.items_per_litre.is_some() {
        LIQUID_SLOT
    } else {
        SOLID_SLOT
    };
    contents[slot] = Some(output).filter(|s| !s.is_empty());
}

/// Units consumed for `outsize` batches of `per_batch` units. Halves round
/// to even.
fn batch_units(per_batch: f64, outsize: f64) -> u32 {
    (per_batch * outsize).round_ties_even().max(0.0) as u32
}
