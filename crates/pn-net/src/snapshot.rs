//! Read-only diagnostics for one network.

use std::fmt;

use pn_chem::Mixture;
use pn_core::NetworkId;
use pn_core::units::{Pressure, Temperature, Volume, as_kelvin, as_kpa, as_liters, k, kpa, liters};

/// Pressure, temperature and gas volume of a network at one instant.
///
/// Produced for debug tooling only; holding one never affects the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkSnapshot {
    pub network: NetworkId,
    pub pressure: Pressure,
    pub temperature: Temperature,
    pub volume: Volume,
}

impl NetworkSnapshot {
    pub fn of(network: NetworkId, mixture: &Mixture) -> Self {
        Self {
            network,
            pressure: kpa(mixture.pressure()),
            temperature: k(mixture.temperature()),
            volume: liters(mixture.volume()),
        }
    }
}

impl fmt::Display for NetworkSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pressure: {} kPa", sig3(as_kpa(self.pressure)))?;
        writeln!(f, "Temperature: {} K", sig3(as_kelvin(self.temperature)))?;
        write!(f, "Volume: {} L", sig3(as_liters(self.volume)))
    }
}

/// Format with three significant digits.
fn sig3(v: f64) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let magnitude = v.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    if magnitude >= 3 {
        let unit = 10f64.powi(magnitude - 2);
        return format!("{:.0}", (v / unit).round() * unit);
    }
    format!("{v:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pn_chem::Species;

    #[test]
    fn sig3_formats() {
        assert_eq!(sig3(0.0), "0");
        assert_eq!(sig3(293.15), "293");
        assert_eq!(sig3(101.325), "101");
        assert_eq!(sig3(4.5678), "4.57");
        assert_eq!(sig3(0.012345), "0.0123");
        assert_eq!(sig3(12345.0), "12300");
    }

    #[test]
    fn snapshot_reads_mixture() {
        let mut mix = Mixture::new(22.414, 273.15).unwrap();
        mix.set_moles(Species::Nitrogen, 1.0).unwrap();
        let snap = NetworkSnapshot::of(NetworkId::from_index(0), &mix);

        assert!((as_kpa(snap.pressure) - 101.325).abs() < 0.05);
        assert!((as_kelvin(snap.temperature) - 273.15).abs() < 1e-9);
        let text = snap.to_string();
        assert!(text.contains("Pressure: 101 kPa"));
        assert!(text.contains("Temperature: 273 K"));
        assert!(text.contains("Volume: 22.4 L"));
    }
}
