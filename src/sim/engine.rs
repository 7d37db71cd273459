//! Simulation engine that drives every model across the grid for one tick.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rand::{SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::error::Result;
use crate::grid::{GridMetadata, RegionId, SubstationId};
use crate::models::weather::INITIAL_TEMPERATURE_C;
use crate::models::{
    GenerationModel, LineFlowModel, LoadInput, LoadModel, PricingModel, TemperatureState,
    TickContext, WeatherModel,
};
use crate::profiles::ProfileKind;
use crate::records::{
    AlertRecord, AlertStatus, AlertType, GenerationRecord, LineRecord, LoadRecord, PriceRecord,
    RecordSet, WeatherRecord,
};

/// Model parameters that are exposed to configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParams {
    pub seed: u64,
    pub overload_threshold: f64,
    pub alert_probability: f64,
}

/// Simulation engine owning the grid snapshot, the models, the temperature
/// state, and the single random source every draw comes from.
pub struct Engine {
    metadata: GridMetadata,
    profiles: BTreeMap<SubstationId, ProfileKind>,
    temperatures: TemperatureState,
    weather: WeatherModel,
    pricing: PricingModel,
    load: LoadModel,
    generation: GenerationModel,
    line_flow: LineFlowModel,
    rng: StdRng,
}

impl Engine {
    /// Creates an engine and fixes each substation's archetype.
    ///
    /// Pinned archetypes are kept; the rest are drawn in substation order
    /// from the seeded random source before the first tick.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a model cannot be built.
    pub fn new(metadata: GridMetadata, params: EngineParams) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(params.seed);

        let profiles = metadata
            .substations
            .iter()
            .map(|s| (s.id, s.profile.unwrap_or_else(|| ProfileKind::draw(&mut rng))))
            .collect::<BTreeMap<_, _>>();
        for (id, kind) in &profiles {
            debug!(substation = id, profile = %kind, "assigned load profile");
        }

        let weather = WeatherModel::default();
        let temperatures =
            TemperatureState::new(metadata.regions.iter().map(|r| r.id), INITIAL_TEMPERATURE_C);

        Ok(Self {
            metadata,
            profiles,
            temperatures,
            weather,
            pricing: PricingModel::default(),
            load: LoadModel::with_alert_gate(params.overload_threshold, params.alert_probability),
            generation: GenerationModel::new()?,
            line_flow: LineFlowModel::default(),
            rng,
        })
    }

    pub fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }

    /// Archetype fixed for a substation at construction.
    pub fn profile_of(&self, substation: SubstationId) -> Option<ProfileKind> {
        self.profiles.get(&substation).copied()
    }

    pub fn temperatures(&self) -> &TemperatureState {
        &self.temperatures
    }

    /// Executes one tick and returns every row it produced.
    ///
    /// Weather and price run first for all regions, then substation load
    /// (which reads the region's fresh temperature), generation, and lines.
    pub fn step(&mut self, timestamp: NaiveDateTime) -> RecordSet {
        let ctx = TickContext::new(timestamp);
        let mut out = RecordSet::default();

        // 1. Weather for every region, then prices.
        let mut region_temps: BTreeMap<RegionId, f64> = BTreeMap::new();
        for region in &self.metadata.regions {
            let reading =
                self.weather
                    .observe(&mut self.temperatures, region.id, ctx.hour, &mut self.rng);
            region_temps.insert(region.id, reading.temperature_c);
            out.weather.push(WeatherRecord {
                timestamp,
                region_id: region.id,
                temperature: reading.temperature_c,
                conditions: reading.condition,
            });
        }
        for region in &self.metadata.regions {
            out.prices.push(PriceRecord {
                timestamp,
                region_id: region.id,
                price_per_mwh: self.pricing.price(ctx.hour, ctx.is_weekend, &mut self.rng),
            });
        }

        // 2. Substation load and overload alerts.
        for sub in &self.metadata.substations {
            let profile = self
                .profiles
                .get(&sub.id)
                .copied()
                .unwrap_or(ProfileKind::Residential);
            let temperature_c = region_temps
                .get(&sub.region_id)
                .copied()
                .unwrap_or(self.weather.initial_c);
            let input = LoadInput {
                capacity_mw: sub.capacity_mw,
                profile,
                hour: ctx.hour,
                is_weekend: ctx.is_weekend,
                temperature_c,
            };
            let reading = self.load.simulate(&input, &mut self.rng);
            out.loads.push(LoadRecord {
                timestamp,
                actual_load_mw: reading.actual_load_mw,
                substation_id: sub.id,
            });
            if let Some(description) = reading.alert {
                debug!(substation = sub.id, %timestamp, %description, "overload alert");
                out.alerts.push(AlertRecord {
                    timestamp,
                    alert_type: AlertType::Overload,
                    description,
                    substation_id: sub.id,
                    status: AlertStatus::New,
                });
            }
        }

        // 3. Generation.
        for generator in &self.metadata.generators {
            out.generation.push(GenerationRecord {
                timestamp,
                actual_generation_mw: self.generation.output(
                    generator.kind,
                    generator.max_output_mw,
                    ctx.hour,
                    &mut self.rng,
                ),
                generator_id: generator.id,
            });
        }

        // 4. Line flow.
        for line in &self.metadata.lines {
            out.lines.push(LineRecord {
                timestamp,
                actual_load_mw: self.line_flow.flow(line.max_load_mw, ctx.hour, &mut self.rng),
                line_id: line.id,
            });
        }

        out
    }

    /// Runs every remaining tick of `clock` and returns all rows in one set.
    pub fn run(&mut self, clock: impl IntoIterator<Item = NaiveDateTime>) -> RecordSet {
        let mut all = RecordSet::default();
        for ts in clock {
            let mut tick = self.step(ts);
            all.append(&mut tick);
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Generator, GeneratorKind, PowerLine, Region, Substation};
    use crate::sim::clock::Clock;
    use chrono::{NaiveDate, TimeDelta};

    fn params(seed: u64) -> EngineParams {
        EngineParams {
            seed,
            overload_threshold: 0.98,
            alert_probability: 0.2,
        }
    }

    fn grid() -> GridMetadata {
        GridMetadata {
            regions: vec![Region { id: 1 }, Region { id: 2 }],
            substations: (1..=6)
                .map(|id| Substation {
                    id,
                    capacity_mw: 50.0 * f64::from(id),
                    region_id: 1 + id % 2,
                    profile: None,
                })
                .collect(),
            generators: vec![
                Generator {
                    id: 1,
                    kind: GeneratorKind::Solar,
                    max_output_mw: 80.0,
                },
                Generator {
                    id: 2,
                    kind: GeneratorKind::Wind,
                    max_output_mw: 60.0,
                },
                Generator {
                    id: 3,
                    kind: GeneratorKind::Thermal,
                    max_output_mw: 300.0,
                },
            ],
            lines: vec![PowerLine {
                id: 1,
                max_load_mw: 400.0,
            }],
        }
    }

    fn day() -> Clock {
        let start = NaiveDate::from_ymd_opt(2025, 11, 3)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Clock::new(start, start + TimeDelta::hours(23), TimeDelta::hours(1)).unwrap()
    }

    #[test]
    fn one_row_per_entity_per_tick() {
        let mut engine = Engine::new(grid(), params(42)).unwrap();
        let rows = engine.run(day());
        assert_eq!(rows.weather.len(), 24 * 2);
        assert_eq!(rows.prices.len(), 24 * 2);
        assert_eq!(rows.loads.len(), 24 * 6);
        assert_eq!(rows.generation.len(), 24 * 3);
        assert_eq!(rows.lines.len(), 24);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = Engine::new(grid(), params(777)).unwrap().run(day());
        let b = Engine::new(grid(), params(777)).unwrap().run(day());
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = Engine::new(grid(), params(1)).unwrap().run(day());
        let b = Engine::new(grid(), params(2)).unwrap().run(day());
        assert_ne!(a.weather, b.weather);
    }

    #[test]
    fn profiles_are_fixed_for_the_run() {
        let mut engine = Engine::new(grid(), params(42)).unwrap();
        let before: Vec<_> = (1..=6).map(|id| engine.profile_of(id)).collect();
        engine.run(day());
        let after: Vec<_> = (1..=6).map(|id| engine.profile_of(id)).collect();
        assert_eq!(before, after);
        assert!(before.iter().all(Option::is_some));
    }

    #[test]
    fn pinned_profile_is_respected() {
        let mut g = grid();
        for s in &mut g.substations {
            s.profile = Some(ProfileKind::Commercial);
        }
        let engine = Engine::new(g, params(42)).unwrap();
        assert!((1..=6).all(|id| engine.profile_of(id) == Some(ProfileKind::Commercial)));
    }

    #[test]
    fn loads_stay_within_clipped_capacity() {
        let mut engine = Engine::new(grid(), params(3)).unwrap();
        let rows = engine.run(day());
        for r in &rows.loads {
            let cap = 50.0 * f64::from(r.substation_id);
            assert!(r.actual_load_mw >= cap * 0.1 - 0.01 && r.actual_load_mw <= cap * 1.2 + 0.01);
        }
    }

    #[test]
    fn temperature_state_persists_between_ticks() {
        let mut engine = Engine::new(grid(), params(5)).unwrap();
        let mut clock = day();
        engine.step(clock.tick().unwrap());
        let after_one = engine.temperatures().baseline(1).unwrap();
        engine.step(clock.tick().unwrap());
        let after_two = engine.temperatures().baseline(1).unwrap();
        assert_ne!(after_one, INITIAL_TEMPERATURE_C);
        assert_ne!(after_one, after_two);
    }
}
