//! Liquid phase container.

use crate::catalog::SpeciesCatalog;
use crate::error::{ChemResult, check_quantity, check_temperature};
use crate::species::Species;
use pn_core::units::constants::T20C_K;

/// Liquid held by a network: grams per species at one temperature.
///
/// The occupied volume is not stored; it follows from mass and each species'
/// liquid density, see [`Solution::volume`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    grams: [f64; Species::COUNT],
    /// K
    temperature: f64,
}

impl Solution {
    pub fn new(temperature: f64) -> ChemResult<Self> {
        Ok(Self {
            grams: [0.0; Species::COUNT],
            temperature: check_temperature(temperature)?,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) -> ChemResult<()> {
        self.temperature = check_temperature(temperature)?;
        Ok(())
    }

    #[inline]
    pub fn mass(&self, species: Species) -> f64 {
        self.grams[species.index()]
    }

    pub fn add_mass(&mut self, species: Species, grams: f64) -> ChemResult<()> {
        self.grams[species.index()] += check_quantity(grams, "grams")?;
        Ok(())
    }

    /// Remove up to `grams` of `species` and return how much actually left.
    pub fn remove_mass(&mut self, species: Species, grams: f64) -> ChemResult<f64> {
        let requested = check_quantity(grams, "grams")?;
        let slot = &mut self.grams[species.index()];
        let taken = requested.min(*slot);
        *slot -= taken;
        Ok(taken)
    }

    pub fn total_mass(&self) -> f64 {
        self.grams.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.grams.iter().all(|&g| g <= 0.0)
    }

    /// Species with nonzero mass, in species order.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        Species::ALL
            .iter()
            .map(|&s| (s, self.grams[s.index()]))
            .filter(|(_, g)| *g > 0.0)
    }

    /// Liters occupied by the liquid.
    pub fn volume(&self, catalog: &SpeciesCatalog) -> f64 {
        self.iter()
            .map(|(s, g)| catalog.get(s).liquid_volume(g))
            .sum()
    }

    /// Σ grams · c_liquid, J/K. Species without liquid heat data contribute nothing.
    pub fn heat_capacity(&self, catalog: &SpeciesCatalog) -> f64 {
        self.iter()
            .map(|(s, g)| g * catalog.get(s).liquid_heat_capacity)
            .sum()
    }

    pub fn thermal_energy(&self, catalog: &SpeciesCatalog) -> f64 {
        self.heat_capacity(catalog) * self.temperature
    }

    pub fn scale(&mut self, factor: f64) -> ChemResult<()> {
        let factor = check_quantity(factor, "scale factor")?;
        for g in &mut self.grams {
            *g *= factor;
        }
        Ok(())
    }

    pub fn absorb(&mut self, other: &Solution) {
        for (mine, theirs) in self.grams.iter_mut().zip(other.grams.iter()) {
            *mine += theirs;
        }
    }

    pub fn mass_by_species(&self) -> [f64; Species::COUNT] {
        self.grams
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self {
            grams: [0.0; Species::COUNT],
            temperature: T20C_K,
        }
    }
}
