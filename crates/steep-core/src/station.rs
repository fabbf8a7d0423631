//! Brewing stations and the brewery that owns them.
//!
//! A [`Station`] is a two-slot container with a liquid temperature and a
//! [`BrewState`]. Content changes are detected by comparing slot
//! fingerprints against those recorded at the last authoritative update, so
//! callers can poll [`Station::sync`] cheaply after any inventory operation.

use crate::id::StationId;
use crate::item::{
    fingerprint, Contents, ItemStack, SlotFingerprint, LIQUID_SLOT, SLOT_COUNT, SOLID_SLOT,
};
use crate::session::{BrewContext, BrewState, BrewView};
use crate::settings::BrewSettings;
use slotmap::SlotMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    contents: Contents,
    temperature: f64,
    brew: BrewState,
    fingerprints: [SlotFingerprint; SLOT_COUNT],
}

impl Station {
    /// An empty station at room temperature.
    pub fn new(settings: &BrewSettings) -> Self {
        Self {
            contents: [None, None],
            temperature: settings.room_temperature,
            brew: BrewState::default(),
            fingerprints: [SlotFingerprint::default(); SLOT_COUNT],
        }
    }

    /// Restore a station from persisted parts. The next [`sync`](Self::sync)
    /// re-evaluates the contents.
    pub fn restore(contents: Contents, temperature: f64, brew: BrewState) -> Self {
        Self {
            contents,
            temperature,
            brew,
            fingerprints: [SlotFingerprint::default(); SLOT_COUNT],
        }
    }

    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    /// Direct slot access. Changes are picked up by the next
    /// [`sync`](Self::sync) or [`tick`](Self::tick).
    pub fn contents_mut(&mut self) -> &mut Contents {
        &mut self.contents
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn brew(&self) -> &BrewState {
        &self.brew
    }

    pub fn is_hot(&self, settings: &BrewSettings) -> bool {
        self.temperature > settings.room_temperature
    }

    /// Heating accepts any temperature. Cooling stops at room temperature,
    /// or at the current temperature if that is already below it.
    pub fn set_temperature(&mut self, temperature: f64, settings: &BrewSettings) {
        if temperature >= self.temperature {
            self.temperature = temperature;
        } else {
            self.temperature = temperature
                .max(settings.room_temperature)
                .min(self.temperature);
        }
    }

    /// Authoritative update if the contents changed since the last one.
    pub fn sync(&mut self, now: f64, ctx: &BrewContext<'_>) -> Option<BrewView> {
        if fingerprint(&self.contents) == self.fingerprints {
            return None;
        }
        Some(self.update(now, ctx))
    }

    /// Periodic authoritative update. Afterwards a hot liquid loses
    /// `passive_cool_per_second` degrees per elapsed second.
    pub fn tick(&mut self, now: f64, elapsed_seconds: f64, ctx: &BrewContext<'_>) -> BrewView {
        let view = self.update(now, ctx);
        let settings = ctx.settings;
        if self.is_hot(settings) && elapsed_seconds > 0.0 {
            let cooled = self.temperature - settings.passive_cool_per_second * elapsed_seconds;
            self.set_temperature(cooled, settings);
        }
        view
    }

    /// Read-only view for display.
    pub fn probe(&self, now: f64, ctx: &BrewContext<'_>) -> BrewView {
        self.brew.probe(now, &self.contents, self.temperature, ctx)
    }

    fn update(&mut self, now: f64, ctx: &BrewContext<'_>) -> BrewView {
        let view = self
            .brew
            .update(now, &mut self.contents, self.temperature, ctx);
        self.fingerprints = fingerprint(&self.contents);
        view
    }

    /// Insert as much of `stack` as fits. Liquids go to the liquid slot up to
    /// the capacity in litres; solids go to the solid slot up to the max
    /// stack size, and only if some recipe uses them. A slot only merges with
    /// the same collectible. Returns what did not fit.
    pub fn try_insert(&mut self, stack: ItemStack, ctx: &BrewContext<'_>) -> Option<ItemStack> {
        if stack.is_empty() {
            return None;
        }
        let Some(def) = ctx.catalog.get(stack.item) else {
            return Some(stack);
        };

        let (slot, capacity) = match def.items_per_litre() {
            Some(per_litre) if per_litre > 0.0 => (
                LIQUID_SLOT,
                (ctx.settings.liquid_capacity_litres * per_litre as f64).floor() as u32,
            ),
            Some(_) => return Some(stack),
            None => {
                let accepted = ctx
                    .registry
                    .ingredient_codes()
                    .iter()
                    .any(|p| p.matches(&def.code));
                if !accepted {
                    return Some(stack);
                }
                (SOLID_SLOT, ctx.settings.solid_max_stack)
            }
        };

        insert_into(&mut self.contents[slot], stack, capacity)
    }

    /// Take the solid slot's stack. Refused while the liquid is hot.
    pub fn take_solid(&mut self, settings: &BrewSettings) -> Option<ItemStack> {
        if self.is_hot(settings) {
            return None;
        }
        self.contents[SOLID_SLOT].take()
    }

    pub fn take_liquid(&mut self) -> Option<ItemStack> {
        self.contents[LIQUID_SLOT].take()
    }
}

fn insert_into(slot: &mut Option<ItemStack>, mut stack: ItemStack, capacity: u32) -> Option<ItemStack> {
    match slot {
        Some(existing) if !existing.is_empty() => {
            if existing.item != stack.item {
                return Some(stack);
            }
            let space = capacity.saturating_sub(existing.quantity);
            existing.quantity += stack.take(space);
        }
        _ => {
            let moved = stack.take(capacity);
            if moved > 0 {
                *slot = Some(ItemStack {
                    quantity: moved,
                    ..stack.clone()
                });
            }
        }
    }
    Some(stack).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Brewery
// ---------------------------------------------------------------------------

/// Owns every station, keyed by [`StationId`].
#[derive(Debug, Default)]
pub struct Brewery {
    stations: SlotMap<StationId, Station>,
}

impl Brewery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, station: Station) -> StationId {
        self.stations.insert(station)
    }

    pub fn remove(&mut self, id: StationId) -> Option<Station> {
        self.stations.remove(id)
    }

    pub fn get(&self, id: StationId) -> Option<&Station> {
        self.stations.get(id)
    }

    pub fn get_mut(&mut self, id: StationId) -> Option<&mut Station> {
        self.stations.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StationId, &Station)> {
        self.stations.iter()
    }

    /// Tick every station.
    pub fn tick_all(
        &mut self,
        now: f64,
        elapsed_seconds: f64,
        ctx: &BrewContext<'_>,
    ) -> Vec<(StationId, BrewView)> {
        self.stations
            .iter_mut()
            .map(|(id, station)| (id, station.tick(now, elapsed_seconds, ctx)))
            .collect()
    }

    /// Sync every station; only stations whose contents changed report.
    pub fn sync_all(&mut self, now: f64, ctx: &BrewContext<'_>) -> Vec<(StationId, BrewView)> {
        self.stations
            .iter_mut()
            .filter_map(|(id, station)| station.sync(now, ctx).map(|view| (id, view)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RecipeRegistry;
    use crate::session::BrewPhase;
    use crate::test_utils::*;

    struct Bench {
        f: TeaFixture,
        registry: RecipeRegistry,
        settings: BrewSettings,
    }

    impl Bench {
        fn new() -> Self {
            let f = tea_fixture();
            let registry = registry_with(&f.catalog, &[lily_tea_template(), rose_tea_template()]);
            Self {
                f,
                registry,
                settings: BrewSettings::default(),
            }
        }

        fn ctx(&self) -> BrewContext<'_> {
            BrewContext::new(&self.registry, &self.f.catalog, &self.settings)
        }

        fn filled_station(&self) -> Station {
            let mut s = Station::new(&self.settings);
            assert!(s.try_insert(stack(self.f.lily, 1), &self.ctx()).is_none());
            assert!(s.try_insert(litres(self.f.water, 1.0), &self.ctx()).is_none());
            s
        }
    }

    #[test]
    fn insert_routes_by_kind() {
        let b = Bench::new();
        let s = b.filled_station();
        assert_eq!(s.contents()[SOLID_SLOT].as_ref().unwrap().item, b.f.lily);
        assert_eq!(s.contents()[LIQUID_SLOT].as_ref().unwrap().item, b.f.water);
    }

    #[test]
    fn insert_respects_capacities() {
        let b = Bench::new();
        let mut s = Station::new(&b.settings);
        let left = s.try_insert(litres(b.f.water, 3.0), &b.ctx()).unwrap();
        assert_eq!(left.quantity, 100);
        assert_eq!(s.contents()[LIQUID_SLOT].as_ref().unwrap().quantity, 200);

        let left = s.try_insert(stack(b.f.lily, 5), &b.ctx()).unwrap();
        assert_eq!(left.quantity, 3);
        assert_eq!(s.contents()[SOLID_SLOT].as_ref().unwrap().quantity, 2);
    }

    #[test]
    fn insert_merges_only_same_item() {
        let b = Bench::new();
        let mut s = Station::new(&b.settings);
        assert!(s.try_insert(stack(b.f.lily, 1), &b.ctx()).is_none());
        assert!(s.try_insert(stack(b.f.lily, 1), &b.ctx()).is_none());
        assert_eq!(s.contents()[SOLID_SLOT].as_ref().unwrap().quantity, 2);

        let rose = s.try_insert(stack(b.f.rose, 1), &b.ctx()).unwrap();
        assert_eq!(rose.item, b.f.rose);

        assert!(s.try_insert(litres(b.f.water, 1.0), &b.ctx()).is_none());
        let milk = s.try_insert(litres(b.f.milk, 0.5), &b.ctx()).unwrap();
        assert_eq!(milk.quantity, 50);
    }

    #[test]
    fn insert_rejects_unused_solids() {
        let b = Bench::new();
        let mut s = Station::new(&b.settings);
        let mint = s.try_insert(stack(b.f.mint, 1), &b.ctx()).unwrap();
        assert_eq!(mint.quantity, 1);
        assert!(s.contents()[SOLID_SLOT].is_none());
    }

    #[test]
    fn sync_only_on_change() {
        let b = Bench::new();
        let mut s = b.filled_station();
        let view = s.sync(0.0, &b.ctx()).unwrap();
        assert_eq!(view.phase, BrewPhase::Brewing);
        assert!(s.sync(0.5, &b.ctx()).is_none());

        s.contents_mut()[SOLID_SLOT] = Some(stack(b.f.rose, 1));
        let view = s.sync(1.0, &b.ctx()).unwrap();
        assert_eq!(view.recipe_code.as_deref(), Some("rose-tea"));
        assert_eq!(s.brew().crafting_start, 1.0);
    }

    #[test]
    fn tick_brews_and_cools() {
        let b = Bench::new();
        let mut s = b.filled_station();
        s.set_temperature(90.0, &b.settings);

        let view = s.tick(0.0, 1.0, &b.ctx());
        assert_eq!(view.phase, BrewPhase::Brewing);
        assert!((s.temperature() - 89.9).abs() < 1e-9);

        let view = s.tick(2.0, 1.0, &b.ctx());
        assert_eq!(view.phase, BrewPhase::Brewed);
        let tea = s.take_liquid().unwrap();
        assert_eq!(tea.item, b.f.lily_tea);
        assert_eq!(tea.transitioned_hours, 0.0);
    }

    #[test]
    fn passive_cooling_stops_at_room_temperature() {
        let b = Bench::new();
        let mut s = Station::new(&b.settings);
        s.set_temperature(20.5, &b.settings);
        s.tick(0.0, 60.0, &b.ctx());
        assert_eq!(s.temperature(), 20.0);
    }

    #[test]
    fn set_temperature_cooling_floor() {
        let b = Bench::new();
        let mut s = Station::new(&b.settings);
        s.set_temperature(95.0, &b.settings);
        s.set_temperature(5.0, &b.settings);
        assert_eq!(s.temperature(), 20.0);

        let mut cold = Station::restore([None, None], 10.0, BrewState::default());
        cold.set_temperature(5.0, &b.settings);
        assert_eq!(cold.temperature(), 10.0);
        cold.set_temperature(15.0, &b.settings);
        assert_eq!(cold.temperature(), 15.0);
    }

    #[test]
    fn solid_locked_while_hot() {
        let b = Bench::new();
        let mut s = b.filled_station();
        s.set_temperature(80.0, &b.settings);
        assert!(s.take_solid(&b.settings).is_none());
        s.set_temperature(20.0, &b.settings);
        assert_eq!(s.take_solid(&b.settings).unwrap().item, b.f.lily);
    }

    #[test]
    fn probe_matches_tick_without_mutating() {
        let b = Bench::new();
        let mut s = b.filled_station();
        s.set_temperature(90.0, &b.settings);
        s.tick(0.0, 0.0, &b.ctx());

        let before = s.clone();
        let probed = s.probe(1.0, &b.ctx());
        assert_eq!(s, before);
        let ticked = s.tick(1.0, 0.0, &b.ctx());
        assert_eq!(probed, ticked);
    }

    #[test]
    fn brewery_ticks_every_station() {
        let b = Bench::new();
        let mut brewery = Brewery::new();
        let hot = brewery.add(b.filled_station());
        let empty = brewery.add(Station::new(&b.settings));
        brewery.get_mut(hot).unwrap().set_temperature(90.0, &b.settings);
        assert_eq!(brewery.len(), 2);

        let views = brewery.tick_all(0.0, 1.0, &b.ctx());
        assert_eq!(views.len(), 2);
        for (id, view) in &views {
            let expected = if *id == hot {
                BrewPhase::Brewing
            } else {
                BrewPhase::Inactive
            };
            assert_eq!(view.phase, expected);
        }

        assert!(brewery.sync_all(0.5, &b.ctx()).is_empty());
        brewery.get_mut(empty).unwrap().contents_mut()[SOLID_SLOT] = Some(stack(b.f.rose, 1));
        let changed = brewery.sync_all(0.5, &b.ctx());
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].0, empty);

        assert!(brewery.remove(empty).is_some());
        assert!(brewery.get(empty).is_none());
        assert_eq!(brewery.iter().count(), 1);
    }
}
