//! pn-net: pipe network lifecycle and phase equilibrium for pipenet.
//!
//! Provides:
//! - `NetworkVolume`: one connected network's segments, gas and liquid
//! - Join, leave, split and merge with per-species mass conservation
//! - `EquilibriumSolver`: damped gas/liquid equilibration
//! - `PipeNetworks`: the per-tick driver (events, equilibration, reactions)
//! - `NetworkSnapshot` for diagnostics
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pn_chem::SpeciesCatalog;
//! use pn_core::{GridId, SegmentId};
//! use pn_net::{NoReactions, PipeNetworks, SolverConfig};
//!
//! let mut nets = PipeNetworks::new(Arc::new(SpeciesCatalog::builtin()), SolverConfig::default())?;
//! let id = nets.create(
//!     Some(GridId::from_index(0)),
//!     &[(SegmentId::from_index(1), 10.0), (SegmentId::from_index(2), 20.0)],
//! )?;
//! nets.tick(&mut NoReactions)?;
//!
//! assert_eq!(nets.get(id).unwrap().total_capacity(), 30.0);
//! # Ok::<(), pn_net::NetError>(())
//! ```

pub mod equilibrium;
pub mod error;
pub mod events;
pub mod networks;
pub mod registry;
pub mod snapshot;
pub mod volume;

pub use equilibrium::{EquilibriumReport, EquilibriumSolver, SolverConfig};
pub use error::{NetError, NetResult};
pub use events::NetworkEvent;
pub use networks::{NoReactions, PipeNetworks, Reactor, TickReport};
pub use registry::NetworkRegistry;
pub use snapshot::NetworkSnapshot;
pub use volume::NetworkVolume;
