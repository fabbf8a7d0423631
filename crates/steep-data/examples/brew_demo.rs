//! Loads the bundled data directory and brews two teas: one held in band
//! over a heat source, one left to cool.
//!
//! Run with `RUST_LOG=debug` to see load and completion events.

use std::path::Path;
use steep_core::code::AssetCode;
use steep_core::item::{ItemStack, LIQUID_SLOT};
use steep_core::session::{BrewContext, BrewPhase};
use steep_core::station::{Brewery, Station};
use steep_data::load_brew_data;
use tracing_subscriber::EnvFilter;

const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let data = load_brew_data(Path::new(DATA_DIR))?;
    println!("Loaded {} recipes: {:?}", data.registry.len(), data.report);
    for recipe in data.registry.iter() {
        println!(
            "  {:<12} {:.1}h at {}-{} degrees",
            recipe.code, recipe.duration, recipe.min_temperature, recipe.max_temperature
        );
    }

    let id = |code: &str| -> Result<_, Box<dyn std::error::Error>> {
        let code = AssetCode::parse(code)?;
        data.catalog
            .id(&code)
            .ok_or_else(|| format!("{code} missing from catalog").into())
    };
    let water = id("waterportion")?;
    let ctx = BrewContext::new(&data.registry, &data.catalog, &data.settings);

    let mut brewery = Brewery::new();
    let mut stations = Vec::new();
    for (flower, heat) in [("flower-lily", 90.0), ("flower-rose", 60.0)] {
        let mut station = Station::new(&data.settings);
        station.try_insert(ItemStack::new(id(flower)?, 1), &ctx);
        station.try_insert(ItemStack::new(water, 100), &ctx);
        station.set_temperature(heat, &data.settings);
        stations.push((brewery.add(station), flower, heat));
    }
    brewery.sync_all(0.0, &ctx);

    // Half-hour ticks; the heat source tops each pot back up before cooling.
    let mut now = 0.0;
    while now < 3.0 {
        now += 0.5;
        for &(sid, _, heat) in &stations {
            if let Some(station) = brewery.get_mut(sid) {
                station.set_temperature(heat, &data.settings);
            }
        }
        for (sid, view) in brewery.tick_all(now, 1800.0, &ctx) {
            let Some(&(_, flower, _)) = stations.iter().find(|(s, _, _)| *s == sid) else {
                continue;
            };
            println!(
                "t={now:>3.1}h {flower:<12} {:?} {:>5.1}% quality {:.2}",
                view.phase,
                view.progress() * 100.0,
                view.quality
            );
            if view.phase == BrewPhase::Brewed {
                if let Some(liquid) = brewery.get(sid).and_then(|s| s.contents()[LIQUID_SLOT].as_ref()) {
                    println!(
                        "    -> {} units, {:.1}h of shelf life already spent",
                        liquid.quantity, liquid.transitioned_hours
                    );
                }
            }
        }
    }

    Ok(())
}
