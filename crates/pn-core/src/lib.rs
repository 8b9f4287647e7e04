//! pn-core: stable foundation for pipenet.
//!
//! Contains:
//! - units (uom SI types + constructors in the units the pipe network speaks)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for segments, networks and grids)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{PnError, PnResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
