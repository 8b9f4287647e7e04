//! pn-chem: gas and liquid containers for pipenet.
//!
//! Provides:
//! - Species definitions for the gases a pipe network carries
//! - A read-only species catalog (molar mass, heat capacity, boiling point, liquid density)
//! - `Mixture`: the gas phase (moles per species, temperature, allotted volume)
//! - `Solution`: the liquid phase (grams per species, temperature)
//!
//! # Example
//!
//! ```
//! use pn_chem::{Mixture, Species, SpeciesCatalog};
//!
//! let catalog = SpeciesCatalog::builtin();
//! let mut air = Mixture::new(100.0, 293.15).unwrap();
//! air.set_moles(Species::Oxygen, 8.0).unwrap();
//! air.set_moles(Species::Nitrogen, 30.0).unwrap();
//!
//! assert!(air.pressure() > 0.0);
//! assert!(air.heat_capacity(&catalog) > 0.0);
//! ```

pub mod catalog;
pub mod error;
pub mod mixture;
pub mod solution;
pub mod species;

pub use catalog::{PropsOverride, SpeciesCatalog, SpeciesProps};
pub use error::{ChemError, ChemResult};
pub use mixture::Mixture;
pub use solution::Solution;
pub use species::Species;
