//! Per-seed binding of a router template.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::density::{DensityFunction, DensityVisitor, EndIslandsFunction, NoiseHolder};
use crate::error::DensityError;
use crate::noise::{BlendedNoise, NoiseParameters, NormalNoise};
use crate::presets::keys;
use crate::random::legacy_random::LegacyRandom;
use crate::random::{PositionalRandom, Random, RandomSource, RandomSplitter};
use crate::router::NoiseRouter;
use crate::settings::NoiseGeneratorSettings;

/// Name hashed into the base terrain noise stream.
const TERRAIN: &str = "minecraft:terrain";
/// Name hashed into the aquifer stream.
const AQUIFER: &str = "minecraft:aquifer";
/// Name hashed into the ore stream.
const ORE: &str = "minecraft:ore";

/// A router bound to one world seed, plus the seeded streams derived from it.
///
/// Matches vanilla's `RandomState`. Noise instances are created at most once
/// per key and shared by every node that names that key.
pub struct RandomState {
    seed: u64,
    legacy: bool,
    router: NoiseRouter,
    random: RandomSplitter,
    aquifer_random: RandomSplitter,
    ore_random: RandomSplitter,
    noises: Arc<FxHashMap<String, NoiseParameters>>,
    noise_instances: RwLock<FxHashMap<String, Arc<NormalNoise>>>,
    positional_randoms: RwLock<FxHashMap<String, RandomSplitter>>,
}

impl RandomState {
    /// Binds the router template of `settings` to `seed`.
    ///
    /// The template is left untouched; the returned state owns a rewritten
    /// copy in which every noise node holds its seeded instance.
    ///
    /// # Errors
    /// Returns [`DensityError::UnknownNoise`] if a node names a key that is
    /// not registered, or any error raised while building a noise.
    pub fn create(settings: &NoiseGeneratorSettings, seed: u64) -> Result<Self, DensityError> {
        let start = Instant::now();
        let legacy = settings.use_legacy_random_source;
        let random = RandomSource::new(seed, legacy).next_positional();
        let mut state = Self {
            seed,
            legacy,
            router: settings.noise_router.clone(),
            random,
            aquifer_random: random.with_hash_of(AQUIFER).next_positional(),
            ore_random: random.with_hash_of(ORE).next_positional(),
            noises: Arc::clone(&settings.noises),
            noise_instances: RwLock::new(FxHashMap::default()),
            positional_randoms: RwLock::new(FxHashMap::default()),
        };
        let router = state.router.map_all(&mut NoiseBinder { state: &state })?;
        state.router = router;

        log::info!(
            "Bound noise router for seed {seed} ({} nodes, {} noises) in {:?}",
            state.router.dag.len(),
            state.noise_instances.read().len(),
            start.elapsed()
        );
        Ok(state)
    }

    /// The world seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The seed-bound router.
    #[must_use]
    pub const fn router(&self) -> &NoiseRouter {
        &self.router
    }

    /// The root positional factory.
    #[must_use]
    pub const fn random(&self) -> &RandomSplitter {
        &self.random
    }

    /// Positional factory for aquifer decisions.
    #[must_use]
    pub const fn aquifer_random(&self) -> &RandomSplitter {
        &self.aquifer_random
    }

    /// Positional factory for ore vein decisions.
    #[must_use]
    pub const fn ore_random(&self) -> &RandomSplitter {
        &self.ore_random
    }

    /// The seeded noise for `key`, created on first use.
    ///
    /// # Errors
    /// Returns [`DensityError::UnknownNoise`] if `key` is not registered.
    pub fn get_or_create_noise(&self, key: &str) -> Result<Arc<NormalNoise>, DensityError> {
        if let Some(noise) = self.noise_instances.read().get(key) {
            return Ok(Arc::clone(noise));
        }
        let parameters = self
            .noises
            .get(key)
            .ok_or_else(|| DensityError::UnknownNoise(key.to_owned()))?;
        let mut instances = self.noise_instances.write();
        let noise = instances
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(NormalNoise::create(&self.random, key, parameters)));
        Ok(Arc::clone(noise))
    }

    /// Positional factory derived from `name`, created on first use.
    pub fn get_or_create_random_factory(&self, name: &str) -> RandomSplitter {
        if let Some(factory) = self.positional_randoms.read().get(name) {
            return *factory;
        }
        *self
            .positional_randoms
            .write()
            .entry(name.to_owned())
            .or_insert_with(|| self.random.with_hash_of(name).next_positional())
    }

    fn legacy_noise(&self, key: &str) -> Result<Option<Arc<NormalNoise>>, DensityError> {
        let nether_biome = |seed: u64| {
            NormalNoise::create_legacy_nether_biome(
                &mut LegacyRandom::from_seed(seed),
                &NoiseParameters::new(-7, vec![1.0, 1.0]),
            )
        };
        let noise = match key {
            keys::TEMPERATURE => nether_biome(self.seed)?,
            keys::VEGETATION => nether_biome(self.seed.wrapping_add(1))?,
            keys::SHIFT => NormalNoise::create(&self.random, key, &NoiseParameters::new(0, vec![0.0])),
            _ => return Ok(None),
        };
        Ok(Some(Arc::new(noise)))
    }
}

/// Attaches seeded instances to every seed-dependent node.
struct NoiseBinder<'a> {
    state: &'a RandomState,
}

impl NoiseBinder<'_> {
    fn bind(&self, holder: &NoiseHolder) -> Result<NoiseHolder, DensityError> {
        let key = holder.key.as_str();
        let legacy = if self.state.legacy {
            self.state.legacy_noise(key)?
        } else {
            None
        };
        let noise = match legacy {
            Some(noise) => noise,
            None => self.state.get_or_create_noise(key)?,
        };
        Ok(NoiseHolder::bound(key, noise))
    }
}

impl DensityVisitor for NoiseBinder<'_> {
    fn visit(&mut self, node: DensityFunction) -> Result<DensityFunction, DensityError> {
        Ok(match node {
            DensityFunction::Noise(mut noise) => {
                noise.noise = self.bind(&noise.noise)?;
                DensityFunction::Noise(noise)
            }
            DensityFunction::ShiftedNoise(mut noise) => {
                noise.noise = self.bind(&noise.noise)?;
                DensityFunction::ShiftedNoise(noise)
            }
            DensityFunction::ShiftA(mut shift) => {
                shift.noise = self.bind(&shift.noise)?;
                DensityFunction::ShiftA(shift)
            }
            DensityFunction::ShiftB(mut shift) => {
                shift.noise = self.bind(&shift.noise)?;
                DensityFunction::ShiftB(shift)
            }
            DensityFunction::Shift(mut shift) => {
                shift.noise = self.bind(&shift.noise)?;
                DensityFunction::Shift(shift)
            }
            DensityFunction::WeirdScaledSampler(mut sampler) => {
                sampler.noise = self.bind(&sampler.noise)?;
                DensityFunction::WeirdScaledSampler(sampler)
            }
            DensityFunction::BlendedNoise(mut blended) => {
                let noise = if self.state.legacy {
                    BlendedNoise::new(&mut LegacyRandom::from_seed(self.state.seed), blended.parameters)?
                } else {
                    BlendedNoise::new(&mut self.state.random.with_hash_of(TERRAIN), blended.parameters)?
                };
                blended.noise = Some(Arc::new(noise));
                DensityFunction::BlendedNoise(blended)
            }
            DensityFunction::EndIslands(_) => DensityFunction::EndIslands(EndIslandsFunction::new(self.state.seed)),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::FunctionContext;
    use crate::noise::EndIslands;
    use crate::presets;

    fn holders(router: &NoiseRouter) -> impl Iterator<Item = &NoiseHolder> {
        router.dag.nodes().iter().filter_map(|node| match node {
            DensityFunction::Noise(noise) => Some(&noise.noise),
            DensityFunction::ShiftedNoise(noise) => Some(&noise.noise),
            DensityFunction::ShiftA(shift) => Some(&shift.noise),
            DensityFunction::ShiftB(shift) => Some(&shift.noise),
            DensityFunction::WeirdScaledSampler(sampler) => Some(&sampler.noise),
            _ => None,
        })
    }

    #[test]
    fn test_binds_every_noise_and_keeps_template() {
        let settings = presets::overworld().unwrap();
        let state = RandomState::create(&settings, 42).unwrap();
        assert!(holders(state.router()).all(NoiseHolder::is_bound));
        assert!(!holders(&settings.noise_router).any(NoiseHolder::is_bound));
    }

    #[test]
    fn test_same_seed_same_values() {
        let settings = presets::overworld().unwrap();
        let a = RandomState::create(&settings, 1234).unwrap();
        let b = RandomState::create(&settings, 1234).unwrap();
        for (x, y, z) in [(0, 0, 0), (-317, 40, 1021), (8000, -50, -123)] {
            let ctx = FunctionContext::new(x, y, z);
            for root in a.router().roots() {
                let expected = a.router().dag.evaluate(root, &ctx);
                let actual = b.router().dag.evaluate(root, &ctx);
                assert_eq!(expected.to_bits(), actual.to_bits());
            }
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let settings = presets::overworld().unwrap();
        let a = RandomState::create(&settings, 1).unwrap();
        let b = RandomState::create(&settings, 2).unwrap();
        let differs = (0..16).any(|i| {
            let ctx = FunctionContext::new(i * 97, 0, i * -53);
            let router = a.router();
            router.dag.evaluate(router.continents, &ctx) != b.router().dag.evaluate(b.router().continents, &ctx)
        });
        assert!(differs);
    }

    #[test]
    fn test_noise_instances_are_shared() {
        let settings = presets::overworld().unwrap();
        let state = RandomState::create(&settings, 7).unwrap();
        let first = state.get_or_create_noise(keys::CONTINENTALNESS).unwrap();
        let second = state.get_or_create_noise(keys::CONTINENTALNESS).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        let bound = holders(state.router())
            .filter(|holder| holder.key == keys::CONTINENTALNESS)
            .filter_map(|holder| holder.noise.as_ref())
            .all(|noise| Arc::ptr_eq(noise, &first));
        assert!(bound);
    }

    #[test]
    fn test_unknown_noise() {
        let mut settings = presets::flat(3).unwrap();
        let mut dag = (*settings.noise_router.dag).clone();
        let noise = dag.noise("minecraft:missing", 1.0, 1.0);
        let mut roots = settings.noise_router.roots();
        roots[0] = noise;
        settings.noise_router = NoiseRouter::from_roots(Arc::new(dag), roots).unwrap();
        let err = RandomState::create(&settings, 0).err();
        assert_eq!(err, Some(DensityError::UnknownNoise("minecraft:missing".to_owned())));
    }

    #[test]
    fn test_legacy_substitutes() {
        let mut settings = presets::overworld().unwrap();
        settings.use_legacy_random_source = true;
        let state = RandomState::create(&settings, 99).unwrap();
        let temperature = holders(state.router())
            .find(|holder| holder.key == keys::TEMPERATURE)
            .and_then(|holder| holder.noise.clone())
            .unwrap();
        let registered = state.get_or_create_noise(keys::TEMPERATURE).unwrap();
        assert!(!Arc::ptr_eq(&temperature, &registered));
    }

    fn bound_temperature(state: &RandomState) -> Arc<NormalNoise> {
        holders(state.router())
            .find(|holder| holder.key == keys::TEMPERATURE)
            .and_then(|holder| holder.noise.clone())
            .unwrap()
    }

    #[test]
    #[allow(clippy::float_cmp, reason = "golden values are exact")]
    fn test_seed_zero_temperature_is_pinned() {
        let points = [(0.0, 0.0, 0.0), (1234.5, 64.0, -987.25), (-40_000.0, -30.0, 12_000.0)];

        let modern = RandomState::create(&presets::overworld().unwrap(), 0).unwrap();
        let noise = bound_temperature(&modern);
        let expected = [0.122_332_882_811_413_12, -0.317_244_294_877_394_25, 0.093_667_214_301_286_91];
        for ((x, y, z), value) in points.into_iter().zip(expected) {
            assert_eq!(noise.get_value(x, y, z), value, "modern at {x} {y} {z}");
        }

        let mut settings = presets::overworld().unwrap();
        settings.use_legacy_random_source = true;
        let legacy = RandomState::create(&settings, 0).unwrap();
        let noise = bound_temperature(&legacy);
        let expected = [0.117_381_194_766_224_16, -0.563_243_693_627_185, 0.425_158_369_565_997_6];
        for ((x, y, z), value) in points.into_iter().zip(expected) {
            assert_eq!(noise.get_value(x, y, z), value, "legacy at {x} {y} {z}");
        }
    }

    #[test]
    fn test_end_islands_are_reseeded() {
        let mut settings = presets::flat(1).unwrap();
        let mut dag = (*settings.noise_router.dag).clone();
        let mut roots = settings.noise_router.roots();
        roots[0] = dag.end_islands();
        settings.noise_router = NoiseRouter::from_roots(Arc::new(dag), roots).unwrap();

        let state = RandomState::create(&settings, 5).unwrap();
        let expected = EndIslands::new(5);
        for (x, z) in [(0, 0), (1000, 1000), (-4000, 2500)] {
            let ctx = FunctionContext::new(x, 0, z);
            let bound = state.router().dag.evaluate(state.router().barrier, &ctx);
            assert_eq!(bound.to_bits(), expected.sample(x, z).to_bits());
        }
    }

    #[test]
    fn test_random_factories() {
        let settings = presets::flat(1).unwrap();
        let state = RandomState::create(&settings, 11).unwrap();
        let mut a = state.get_or_create_random_factory("minecraft:test").at(1, 2, 3);
        let mut b = state.get_or_create_random_factory("minecraft:test").at(1, 2, 3);
        assert_eq!(a.next_i64(), b.next_i64());
        let mut aquifer = state.aquifer_random().at(1, 2, 3);
        let mut ore = state.ore_random().at(1, 2, 3);
        assert_ne!(aquifer.next_i64(), ore.next_i64());
    }
}
