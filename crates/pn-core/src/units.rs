// pn-core/src/units.rs

use uom::si::f64::{
    Energy as UomEnergy, Mass as UomMass, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Energy = UomEnergy;
pub type Mass = UomMass;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Volume = UomVolume;

#[inline]
pub fn kpa(v: f64) -> Pressure {
    use uom::si::pressure::kilopascal;
    Pressure::new::<kilopascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn liters(v: f64) -> Volume {
    use uom::si::volume::liter;
    Volume::new::<liter>(v)
}

#[inline]
pub fn grams(v: f64) -> Mass {
    use uom::si::mass::gram;
    Mass::new::<gram>(v)
}

#[inline]
pub fn joules(v: f64) -> Energy {
    use uom::si::energy::joule;
    Energy::new::<joule>(v)
}

/// Inverse of [`kpa`].
#[inline]
pub fn as_kpa(p: Pressure) -> f64 {
    use uom::si::pressure::kilopascal;
    p.get::<kilopascal>()
}

/// Inverse of [`k`].
#[inline]
pub fn as_kelvin(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

/// Inverse of [`liters`].
#[inline]
pub fn as_liters(v: Volume) -> f64 {
    use uom::si::volume::liter;
    v.get::<liter>()
}

pub mod constants {
    /// Universal gas constant, J/(mol·K).
    pub const R_J_PER_MOL_K: f64 = 8.314_462_618;

    /// 20 °C, the temperature a freshly built network starts at.
    pub const T20C_K: f64 = 293.15;

    /// Ideal gas pressure in kPa for `moles` at `t_k` in `v_l` liters.
    ///
    /// With V in liters, nRT/V comes out directly in kPa. Zero volume reads as 0.
    #[inline]
    pub fn ideal_gas_pressure_kpa(moles: f64, t_k: f64, v_l: f64) -> f64 {
        if v_l <= 0.0 {
            return 0.0;
        }
        moles * R_J_PER_MOL_K * t_k / v_l
    }
}
