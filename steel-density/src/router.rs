//! The named roots of a density DAG consumed by chunk generation.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::density::{DensityDag, DensityVisitor};
use crate::error::DensityError;

/// Root names every router must provide, in [`NoiseRouter::roots`] order.
pub const ROOT_NAMES: [&str; 15] = [
    "barrier",
    "fluid_level_floodedness",
    "fluid_level_spread",
    "lava",
    "temperature",
    "vegetation",
    "continents",
    "erosion",
    "depth",
    "ridges",
    "preliminary_surface_level",
    "final_density",
    "vein_toggle",
    "vein_ridged",
    "vein_gap",
];

/// A shared DAG and the indices of its fixed roots.
///
/// Matches vanilla's `NoiseRouter`. Templates are built once per settings
/// preset; [`crate::RandomState`] rebinds them once per seed.
#[derive(Debug, Clone)]
pub struct NoiseRouter {
    /// The DAG every root indexes into.
    pub dag: Arc<DensityDag>,
    /// Aquifer barrier noise.
    pub barrier: usize,
    /// Aquifer floodedness noise.
    pub fluid_level_floodedness: usize,
    /// Aquifer fluid level spread noise.
    pub fluid_level_spread: usize,
    /// Aquifer lava noise.
    pub lava: usize,
    /// Temperature climate parameter.
    pub temperature: usize,
    /// Vegetation (humidity) climate parameter.
    pub vegetation: usize,
    /// Continentalness climate parameter.
    pub continents: usize,
    /// Erosion climate parameter.
    pub erosion: usize,
    /// Depth climate parameter.
    pub depth: usize,
    /// Ridges (weirdness) climate parameter.
    pub ridges: usize,
    /// Estimated surface Y of a column.
    pub preliminary_surface_level: usize,
    /// Terrain density, positive is solid.
    pub final_density: usize,
    /// Ore vein type and presence.
    pub vein_toggle: usize,
    /// Ore vein ridge shape.
    pub vein_ridged: usize,
    /// Ore vein gaps.
    pub vein_gap: usize,
}

impl NoiseRouter {
    /// Builds a router from roots given in [`ROOT_NAMES`] order.
    ///
    /// # Errors
    /// Returns [`DensityError::DanglingReference`] if a root is outside `dag`
    /// or a builder call on `dag` referenced a missing node.
    pub fn from_roots(dag: Arc<DensityDag>, roots: [usize; 15]) -> Result<Self, DensityError> {
        dag.validate()?;
        if let Some(&index) = roots.iter().find(|&&index| index >= dag.len()) {
            return Err(DensityError::DanglingReference { index, len: dag.len() });
        }
        let [
            barrier,
            fluid_level_floodedness,
            fluid_level_spread,
            lava,
            temperature,
            vegetation,
            continents,
            erosion,
            depth,
            ridges,
            preliminary_surface_level,
            final_density,
            vein_toggle,
            vein_ridged,
            vein_gap,
        ] = roots;
        Ok(Self {
            dag,
            barrier,
            fluid_level_floodedness,
            fluid_level_spread,
            lava,
            temperature,
            vegetation,
            continents,
            erosion,
            depth,
            ridges,
            preliminary_surface_level,
            final_density,
            vein_toggle,
            vein_ridged,
            vein_gap,
        })
    }

    /// Builds a router from a name to root bundle.
    ///
    /// Extra names are ignored.
    ///
    /// # Errors
    /// Returns [`DensityError::MissingRoot`] for the first absent name.
    pub fn from_named(dag: Arc<DensityDag>, named: &FxHashMap<String, usize>) -> Result<Self, DensityError> {
        let mut roots = [0; 15];
        for (slot, name) in roots.iter_mut().zip(ROOT_NAMES) {
            *slot = *named.get(name).ok_or(DensityError::MissingRoot(name))?;
        }
        Self::from_roots(dag, roots)
    }

    /// Root indices in [`ROOT_NAMES`] order.
    #[must_use]
    pub const fn roots(&self) -> [usize; 15] {
        [
            self.barrier,
            self.fluid_level_floodedness,
            self.fluid_level_spread,
            self.lava,
            self.temperature,
            self.vegetation,
            self.continents,
            self.erosion,
            self.depth,
            self.ridges,
            self.preliminary_surface_level,
            self.final_density,
            self.vein_toggle,
            self.vein_ridged,
            self.vein_gap,
        ]
    }

    /// The roots keyed by name.
    #[must_use]
    pub fn named(&self) -> FxHashMap<String, usize> {
        ROOT_NAMES
            .iter()
            .zip(self.roots())
            .map(|(name, index)| ((*name).to_owned(), index))
            .collect()
    }

    /// Rewrites every reachable node into a fresh DAG.
    ///
    /// Nodes shared between roots are visited once.
    ///
    /// # Errors
    /// Fails when the visitor fails.
    pub fn map_all(&self, visitor: &mut impl DensityVisitor) -> Result<Self, DensityError> {
        let (dag, roots) = self.dag.rewrite(&self.roots(), visitor)?;
        let mut mapped = [0; 15];
        mapped.copy_from_slice(&roots);
        Self::from_roots(Arc::new(dag), mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::DensityFunction;

    fn single_root_bundle() -> (Arc<DensityDag>, FxHashMap<String, usize>) {
        let mut dag = DensityDag::new();
        let zero = dag.constant(0.0);
        let named = ROOT_NAMES.iter().map(|name| ((*name).to_owned(), zero)).collect();
        (Arc::new(dag), named)
    }

    #[test]
    fn test_missing_root() {
        let (dag, mut named) = single_root_bundle();
        named.remove("vein_gap");
        let err = NoiseRouter::from_named(dag, &named).unwrap_err();
        assert_eq!(err, DensityError::MissingRoot("vein_gap"));
    }

    #[test]
    fn test_named_round_trip() {
        let (dag, named) = single_root_bundle();
        let router = NoiseRouter::from_named(dag, &named).unwrap();
        assert_eq!(router.named(), named);
    }

    #[test]
    fn test_map_all_keeps_sharing() {
        let (dag, named) = single_root_bundle();
        let router = NoiseRouter::from_named(dag, &named).unwrap();
        let mut visits = 0;
        let mapped = router
            .map_all(&mut |node: DensityFunction| -> Result<DensityFunction, DensityError> {
                visits += 1;
                Ok(node)
            })
            .unwrap();
        assert_eq!(visits, 1);
        assert_eq!(mapped.dag.len(), 1);
        assert!(mapped.roots().iter().all(|&root| root == 0));
    }

    #[test]
    fn test_builder_with_missing_input_is_rejected() {
        let mut dag = DensityDag::new();
        let zero = dag.constant(0.0);
        let broken = dag.abs(7);
        assert_eq!(dag.len(), 2);

        let mut roots = [zero; 15];
        roots[11] = broken;
        let err = NoiseRouter::from_roots(Arc::new(dag), roots).unwrap_err();
        assert_eq!(err, DensityError::DanglingReference { index: 7, len: 1 });
    }
}
