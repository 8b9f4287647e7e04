//! Error types for network lifecycle and equilibration.

use pn_chem::ChemError;
use pn_core::{NetworkId, PnError, SegmentId};
use thiserror::Error;

/// Contract violations reported by network operations.
///
/// Physical degenerate states (vacuum, zero heat capacity, non-convergence)
/// are never errors; everything here points at a bad call from upstream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("{segment} is not a member of this network")]
    UnknownSegment { segment: SegmentId },

    #[error("No live {network}")]
    UnknownNetwork { network: NetworkId },

    #[error("{segment} already belongs to a network")]
    SegmentAlreadyMember { segment: SegmentId },

    #[error("{segment} joined with capacity {recorded} L but left with {given} L")]
    CapacityMismatch {
        segment: SegmentId,
        recorded: f64,
        given: f64,
    },

    #[error("Cannot remove {requested} L from a network holding {available} L")]
    CapacityExceeded { requested: f64, available: f64 },

    #[error("Invalid grouping: {what}")]
    InvalidGrouping { what: &'static str },

    #[error("Chemistry error: {0}")]
    Chem(#[from] ChemError),

    #[error("Core error: {0}")]
    Core(#[from] PnError),
}

pub type NetResult<T> = Result<T, NetError>;

impl From<NetError> for PnError {
    fn from(e: NetError) -> Self {
        match e {
            NetError::InvalidArg { what } => PnError::InvalidArg { what },
            NetError::UnknownSegment { .. } => PnError::InvalidArg {
                what: "unknown segment",
            },
            NetError::UnknownNetwork { .. } => PnError::InvalidArg {
                what: "unknown network",
            },
            NetError::SegmentAlreadyMember { .. } => PnError::Invariant {
                what: "segment in two networks",
            },
            NetError::CapacityMismatch { .. } => PnError::InvalidArg {
                what: "segment capacity",
            },
            NetError::CapacityExceeded { .. } => PnError::InvalidArg { what: "capacity" },
            NetError::InvalidGrouping { what } => PnError::InvalidArg { what },
            NetError::Chem(e) => e.into(),
            NetError::Core(e) => e,
        }
    }
}
