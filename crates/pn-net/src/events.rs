//! Lifecycle events reported by the connectivity engine.

use pn_core::{GridId, NetworkId, SegmentId};

/// One topology change, carrying everything needed to apply it deterministically.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    /// A new group of segments with no existing network.
    Created {
        anchor: Option<GridId>,
        segments: Vec<(SegmentId, f64)>,
    },
    SegmentJoined {
        network: NetworkId,
        segment: SegmentId,
        capacity: f64,
    },
    SegmentLeft {
        network: NetworkId,
        segment: SegmentId,
        capacity: f64,
        /// True when the segment is deleted rather than moved elsewhere.
        destroying: bool,
    },
    /// The network broke into these disjoint groups.
    GroupSplit {
        network: NetworkId,
        groups: Vec<Vec<SegmentId>>,
    },
    GroupMerged { networks: Vec<NetworkId> },
}

impl NetworkEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkEvent::Created { .. } => "created",
            NetworkEvent::SegmentJoined { .. } => "segment_joined",
            NetworkEvent::SegmentLeft { .. } => "segment_left",
            NetworkEvent::GroupSplit { .. } => "group_split",
            NetworkEvent::GroupMerged { .. } => "group_merged",
        }
    }
}
