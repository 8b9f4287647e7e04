//! Gas phase container.

use crate::catalog::SpeciesCatalog;
use crate::error::{ChemError, ChemResult, check_quantity, check_temperature};
use crate::species::Species;
use pn_core::units::constants::{T20C_K, ideal_gas_pressure_kpa};

/// Gas held by a network: moles per species at one temperature in an allotted volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixture {
    moles: [f64; Species::COUNT],
    /// K
    temperature: f64,
    /// L
    volume: f64,
}

impl Mixture {
    pub fn new(volume: f64, temperature: f64) -> ChemResult<Self> {
        Ok(Self {
            moles: [0.0; Species::COUNT],
            temperature: check_temperature(temperature)?,
            volume: check_quantity(volume, "gas volume")?,
        })
    }

    /// Empty mixture at 20 °C with no volume.
    pub fn vacuum() -> Self {
        Self {
            moles: [0.0; Species::COUNT],
            temperature: T20C_K,
            volume: 0.0,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) -> ChemResult<()> {
        self.temperature = check_temperature(temperature)?;
        Ok(())
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f64) -> ChemResult<()> {
        self.volume = check_quantity(volume, "gas volume")?;
        Ok(())
    }

    #[inline]
    pub fn moles(&self, species: Species) -> f64 {
        self.moles[species.index()]
    }

    pub fn set_moles(&mut self, species: Species, moles: f64) -> ChemResult<()> {
        self.moles[species.index()] = check_quantity(moles, "moles")?;
        Ok(())
    }

    /// Remove up to `moles` of `species` and return how much actually left.
    pub fn remove_moles(&mut self, species: Species, moles: f64) -> ChemResult<f64> {
        let requested = check_quantity(moles, "moles")?;
        let slot = &mut self.moles[species.index()];
        let taken = requested.min(*slot);
        *slot -= taken;
        Ok(taken)
    }

    /// Add `delta` moles (negative removes), clamping at zero. Returns the new amount.
    pub fn adjust_moles(&mut self, species: Species, delta: f64) -> ChemResult<f64> {
        if !delta.is_finite() {
            return Err(ChemError::InvalidQuantity {
                what: "mole delta",
                value: delta,
            });
        }
        let slot = &mut self.moles[species.index()];
        *slot = (*slot + delta).max(0.0);
        Ok(*slot)
    }

    pub fn total_moles(&self) -> f64 {
        self.moles.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.moles.iter().all(|&n| n <= 0.0)
    }

    /// Species with nonzero moles, in species order.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        Species::ALL
            .iter()
            .map(|&s| (s, self.moles[s.index()]))
            .filter(|(_, n)| *n > 0.0)
    }

    /// Σ moles · cp, J/K.
    pub fn heat_capacity(&self, catalog: &SpeciesCatalog) -> f64 {
        self.iter()
            .map(|(s, n)| n * catalog.get(s).heat_capacity_per_mole)
            .sum()
    }

    /// Sensible heat H·T, J.
    pub fn thermal_energy(&self, catalog: &SpeciesCatalog) -> f64 {
        self.heat_capacity(catalog) * self.temperature
    }

    /// Ideal gas pressure in kPa. Zero volume reads as zero pressure.
    pub fn pressure(&self) -> f64 {
        ideal_gas_pressure_kpa(self.total_moles(), self.temperature, self.volume)
    }

    /// Multiply every species by `factor`.
    pub fn scale(&mut self, factor: f64) -> ChemResult<()> {
        let factor = check_quantity(factor, "scale factor")?;
        for n in &mut self.moles {
            *n *= factor;
        }
        Ok(())
    }

    /// Add every species of `other` to this mixture. Temperature and volume are untouched.
    pub fn absorb(&mut self, other: &Mixture) {
        for (mine, theirs) in self.moles.iter_mut().zip(other.moles.iter()) {
            *mine += theirs;
        }
    }

    /// Copy of the per-species mole table.
    pub fn moles_by_species(&self) -> [f64; Species::COUNT] {
        self.moles
    }
}

impl Default for Mixture {
    fn default() -> Self {
        Self::vacuum()
    }
}

impl TryFrom<&[(Species, f64)]> for Mixture {
    type Error = ChemError;

    /// Zero-volume mixture at 20 °C holding the given moles.
    fn try_from(items: &[(Species, f64)]) -> ChemResult<Self> {
        let mut mix = Mixture::vacuum();
        for &(species, n) in items {
            let current = mix.moles(species);
            mix.set_moles(species, current + check_quantity(n, "moles")?)?;
        }
        Ok(mix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pressure_follows_ideal_gas() {
        let mut mix = Mixture::new(22.414, 273.15).unwrap();
        mix.set_moles(Species::Nitrogen, 1.0).unwrap();
        assert!((mix.pressure() - 101.325).abs() < 0.05);

        mix.set_volume(0.0).unwrap();
        assert_eq!(mix.pressure(), 0.0);
    }

    #[test]
    fn heat_capacity_sums_species() {
        let cat = SpeciesCatalog::builtin();
        let mix = Mixture::try_from(&[(Species::Oxygen, 2.0), (Species::Nitrogen, 1.0)][..])
            .unwrap();
        // 2·20 + 1·30
        assert!((mix.heat_capacity(&cat) - 70.0).abs() < 1e-12);
        assert!((mix.thermal_energy(&cat) - 70.0 * 293.15).abs() < 1e-9);
    }

    #[test]
    fn remove_moles_clamps_at_zero() {
        let mut mix = Mixture::vacuum();
        mix.set_moles(Species::Plasma, 3.0).unwrap();
        let taken = mix.remove_moles(Species::Plasma, 5.0).unwrap();
        assert_eq!(taken, 3.0);
        assert_eq!(mix.moles(Species::Plasma), 0.0);
        assert!(mix.is_empty());
    }

    #[test]
    fn adjust_moles_clamps_at_zero() {
        let mut mix = Mixture::new(10.0, 300.0).unwrap();
        assert_eq!(mix.adjust_moles(Species::Tritium, 2.5).unwrap(), 2.5);
        assert_eq!(mix.adjust_moles(Species::Tritium, -1.0).unwrap(), 1.5);
        assert_eq!(mix.adjust_moles(Species::Tritium, -4.0).unwrap(), 0.0);
        assert!(mix.adjust_moles(Species::Tritium, f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_negative_and_nonphysical_inputs() {
        let mut mix = Mixture::vacuum();
        assert!(mix.set_moles(Species::Oxygen, -1.0).is_err());
        assert!(mix.set_temperature(0.0).is_err());
        assert!(mix.set_volume(f64::NAN).is_err());
        assert!(mix.scale(-0.5).is_err());
        assert!(Mixture::new(10.0, -4.0).is_err());
    }

    #[test]
    fn scale_and_absorb() {
        let mut a = Mixture::try_from(&[(Species::Oxygen, 4.0)][..]).unwrap();
        let b = Mixture::try_from(&[(Species::Oxygen, 1.0), (Species::Tritium, 2.0)][..])
            .unwrap();
        a.scale(0.5).unwrap();
        a.absorb(&b);
        assert_eq!(a.moles(Species::Oxygen), 3.0);
        assert_eq!(a.moles(Species::Tritium), 2.0);
        assert_eq!(a.iter().count(), 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use pn_core::numeric::{Tolerances, nearly_equal};

    proptest! {
        #[test]
        fn scale_is_uniform(
            moles in prop::collection::vec(0.0_f64..500.0, Species::COUNT),
            factor in 0.0_f64..2.0,
        ) {
            let mut mix = Mixture::vacuum();
            for (species, n) in Species::ALL.iter().zip(moles.iter()) {
                mix.set_moles(*species, *n).unwrap();
            }
            let before = mix.total_moles();
            mix.scale(factor).unwrap();

            let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
            prop_assert!(nearly_equal(mix.total_moles(), before * factor, tol));
            for (species, n) in Species::ALL.iter().zip(moles.iter()) {
                prop_assert!(nearly_equal(mix.moles(*species), n * factor, tol));
            }
        }
    }
}
