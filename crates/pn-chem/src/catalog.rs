//! Read-only species property catalog.
//!
//! The catalog is built once and shared behind an `Arc`. When the host's
//! reagent data changes it builds a replacement with [`SpeciesCatalog::rebuilt`]
//! and swaps it in; nothing in the core mutates a catalog in place.

use crate::error::{ChemError, ChemResult};
use crate::species::Species;

/// Static data for one species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesProps {
    /// g/mol
    pub molar_mass: f64,
    /// Gas phase, J/(mol·K)
    pub heat_capacity_per_mole: f64,
    /// K
    pub boiling_point: f64,
    /// Condensed density, g/L
    pub liquid_density: f64,
    /// Liquid phase, J/(g·K). Zero when no data exists.
    pub liquid_heat_capacity: f64,
    /// False when the species has no liquid form the network can hold.
    pub condensable: bool,
}

impl SpeciesProps {
    /// Liters occupied by `grams` of condensed species.
    #[inline]
    pub fn liquid_volume(&self, grams: f64) -> f64 {
        grams / self.liquid_density
    }

    fn validate(&self, species: Species) -> ChemResult<()> {
        let invalid = |what| ChemError::InvalidProps {
            species: species.key(),
            what,
        };
        if !(self.molar_mass.is_finite() && self.molar_mass > 0.0) {
            return Err(invalid("molar_mass"));
        }
        if !(self.heat_capacity_per_mole.is_finite() && self.heat_capacity_per_mole >= 0.0) {
            return Err(invalid("heat_capacity_per_mole"));
        }
        if !(self.boiling_point.is_finite() && self.boiling_point > 0.0) {
            return Err(invalid("boiling_point"));
        }
        if !(self.liquid_density.is_finite() && self.liquid_density > 0.0) {
            return Err(invalid("liquid_density"));
        }
        if !(self.liquid_heat_capacity.is_finite() && self.liquid_heat_capacity >= 0.0) {
            return Err(invalid("liquid_heat_capacity"));
        }
        Ok(())
    }
}

/// Partial update for one species. `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PropsOverride {
    pub molar_mass: Option<f64>,
    pub heat_capacity_per_mole: Option<f64>,
    pub boiling_point: Option<f64>,
    pub liquid_density: Option<f64>,
    pub liquid_heat_capacity: Option<f64>,
    pub condensable: Option<bool>,
}

impl PropsOverride {
    fn apply(&self, base: SpeciesProps) -> SpeciesProps {
        SpeciesProps {
            molar_mass: self.molar_mass.unwrap_or(base.molar_mass),
            heat_capacity_per_mole: self
                .heat_capacity_per_mole
                .unwrap_or(base.heat_capacity_per_mole),
            boiling_point: self.boiling_point.unwrap_or(base.boiling_point),
            liquid_density: self.liquid_density.unwrap_or(base.liquid_density),
            liquid_heat_capacity: self
                .liquid_heat_capacity
                .unwrap_or(base.liquid_heat_capacity),
            condensable: self.condensable.unwrap_or(base.condensable),
        }
    }
}

const fn props(
    molar_mass: f64,
    heat_capacity_per_mole: f64,
    boiling_point: f64,
    liquid_density: f64,
    liquid_heat_capacity: f64,
    condensable: bool,
) -> SpeciesProps {
    SpeciesProps {
        molar_mass,
        heat_capacity_per_mole,
        boiling_point,
        liquid_density,
        liquid_heat_capacity,
        condensable,
    }
}

// Indexed by `Species::index()`. Liquid heat capacities equal the gas value per
// mole, so moving a species between phases leaves H·T unchanged at fixed T.
const BUILTIN: [SpeciesProps; Species::COUNT] = [
    props(32.0, 20.0, 90.19, 1141.0, 20.0 / 32.0, true),      // O2
    props(28.0, 30.0, 77.36, 808.0, 30.0 / 28.0, true),       // N2
    props(44.0, 30.0, 194.65, 1101.0, 30.0 / 44.0, true),     // CO2 (sublimation point)
    props(120.0, 200.0, 150.0, 1400.0, 200.0 / 120.0, true),  // Plasma
    props(6.0, 10.0, 25.0, 260.0, 10.0 / 6.0, true),          // Tritium
    props(18.0, 40.0, 373.15, 1000.0, 40.0 / 18.0, true),     // H2O
    props(17.0, 20.0, 239.8, 682.0, 20.0 / 17.0, true),       // NH3
    props(44.0, 40.0, 184.67, 1230.0, 40.0 / 44.0, true),     // N2O
    props(50.0, 600.0, 180.0, 1500.0, 0.0, false),            // Frezon: no liquid form
];

/// Per-species property table.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesCatalog {
    props: [SpeciesProps; Species::COUNT],
}

impl SpeciesCatalog {
    /// Catalog with the built-in property table.
    pub fn builtin() -> Self {
        Self { props: BUILTIN }
    }

    /// Build a fresh catalog from this one with `overrides` applied.
    ///
    /// The whole result is validated; on error `self` is still the live catalog.
    pub fn rebuilt(&self, overrides: &[(Species, PropsOverride)]) -> ChemResult<Self> {
        let mut props = self.props;
        for (species, o) in overrides {
            props[species.index()] = o.apply(props[species.index()]);
        }
        let catalog = Self { props };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> ChemResult<()> {
        for species in Species::ALL {
            self.props[species.index()].validate(species)?;
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, species: Species) -> &SpeciesProps {
        &self.props[species.index()]
    }

    /// Iterate over every species with its properties.
    pub fn iter(&self) -> impl Iterator<Item = (Species, &SpeciesProps)> + '_ {
        Species::ALL.iter().map(move |&s| (s, self.get(s)))
    }
}

impl Default for SpeciesCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_valid() {
        SpeciesCatalog::builtin().validate().unwrap();
    }

    #[test]
    fn phase_change_is_heat_capacity_neutral() {
        let cat = SpeciesCatalog::builtin();
        for (species, p) in cat.iter().filter(|(_, p)| p.condensable) {
            let per_mole_liquid = p.liquid_heat_capacity * p.molar_mass;
            assert!(
                (per_mole_liquid - p.heat_capacity_per_mole).abs() < 1e-9,
                "{species}"
            );
        }
    }

    #[test]
    fn water_condenses_at_room_temperature() {
        let cat = SpeciesCatalog::builtin();
        let water = cat.get(Species::WaterVapor);
        assert!(water.condensable);
        assert!(water.boiling_point > 293.15);
        assert!((water.liquid_volume(1000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rebuild_applies_override_without_touching_original() {
        let base = SpeciesCatalog::builtin();
        let rebuilt = base
            .rebuilt(&[(
                Species::Plasma,
                PropsOverride {
                    boiling_point: Some(280.0),
                    ..Default::default()
                },
            )])
            .unwrap();

        assert_eq!(rebuilt.get(Species::Plasma).boiling_point, 280.0);
        assert_eq!(base.get(Species::Plasma).boiling_point, 150.0);
        assert_eq!(
            rebuilt.get(Species::Oxygen),
            base.get(Species::Oxygen),
            "untouched species keep their data"
        );
    }

    #[test]
    fn rebuild_rejects_nonphysical_density() {
        let err = SpeciesCatalog::builtin()
            .rebuilt(&[(
                Species::Nitrogen,
                PropsOverride {
                    liquid_density: Some(0.0),
                    ..Default::default()
                },
            )])
            .unwrap_err();
        assert_eq!(
            err,
            ChemError::InvalidProps {
                species: "N2",
                what: "liquid_density"
            }
        );
    }
}
