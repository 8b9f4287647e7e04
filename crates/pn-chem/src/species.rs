//! Chemical species definitions.

use crate::error::ChemError;

/// Gases a pipe network carries. Each one may also exist in the liquid phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    /// Oxygen (O₂)
    Oxygen,
    /// Nitrogen (N₂)
    Nitrogen,
    /// Carbon dioxide (CO₂)
    CarbonDioxide,
    /// Plasma
    Plasma,
    /// Tritium
    Tritium,
    /// Water vapor (H₂O)
    WaterVapor,
    /// Ammonia (NH₃)
    Ammonia,
    /// Nitrous oxide (N₂O)
    NitrousOxide,
    /// Frezon
    Frezon,
}

impl Species {
    pub const COUNT: usize = 9;

    pub const ALL: [Species; Species::COUNT] = [
        Species::Oxygen,
        Species::Nitrogen,
        Species::CarbonDioxide,
        Species::Plasma,
        Species::Tritium,
        Species::WaterVapor,
        Species::Ammonia,
        Species::NitrousOxide,
        Species::Frezon,
    ];

    /// Dense index into per-species arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn key(&self) -> &'static str {
        match self {
            Species::Oxygen => "O2",
            Species::Nitrogen => "N2",
            Species::CarbonDioxide => "CO2",
            Species::Plasma => "Plasma",
            Species::Tritium => "Tritium",
            Species::WaterVapor => "H2O",
            Species::Ammonia => "NH3",
            Species::NitrousOxide => "N2O",
            Species::Frezon => "Frezon",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Species {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "O2" | "OXYGEN" => Ok(Species::Oxygen),
            "N2" | "NITROGEN" => Ok(Species::Nitrogen),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CarbonDioxide),
            "PLASMA" => Ok(Species::Plasma),
            "TRITIUM" | "T2" => Ok(Species::Tritium),
            "H2O" | "WATER" | "WATERVAPOR" | "WATER VAPOR" => Ok(Species::WaterVapor),
            "NH3" | "AMMONIA" | "MIASMA" => Ok(Species::Ammonia),
            "N2O" | "NITROUSOXIDE" | "NITROUS OXIDE" => Ok(Species::NitrousOxide),
            "FREZON" => Ok(Species::Frezon),
            _ => Err(ChemError::UnknownSpecies {
                name: s.trim().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aliases() {
        assert_eq!("o2".parse::<Species>(), Ok(Species::Oxygen));
        assert_eq!(" Water Vapor ".parse::<Species>(), Ok(Species::WaterVapor));
        assert_eq!("miasma".parse::<Species>(), Ok(Species::Ammonia));
        assert!("unobtainium".parse::<Species>().is_err());
    }

    #[test]
    fn unknown_name_is_carried_in_the_error() {
        let err = " unobtainium ".parse::<Species>().unwrap_err();
        assert_eq!(
            err,
            ChemError::UnknownSpecies {
                name: "unobtainium".to_string()
            }
        );
        assert!(err.to_string().contains("unobtainium"));
    }

    #[test]
    fn key_round_trips_through_from_str() {
        for species in Species::ALL {
            assert_eq!(species.key().parse::<Species>(), Ok(species));
        }
    }

    #[test]
    fn index_is_dense() {
        for (i, species) in Species::ALL.iter().enumerate() {
            assert_eq!(species.index(), i);
        }
    }
}
