//! Scenario file schema.
//!
//! Segments and anchors are plain integers in files. Scripted events name a
//! network through one of its member segments, since network ids change on
//! every split and merge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub solver: SolverDef,
    /// Species key -> property overrides applied on top of the builtin catalog.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub catalog: BTreeMap<String, PropsOverrideDef>,
    #[serde(default)]
    pub networks: Vec<NetworkDef>,
    #[serde(default)]
    pub events: Vec<ScriptedEventDef>,
    #[serde(default = "default_ticks")]
    pub ticks: u32,
}

fn default_ticks() -> u32 {
    1
}

fn default_temperature() -> f64 {
    pn_core::units::constants::T20C_K
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SolverDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel_tol: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropsOverrideDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molar_mass: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_capacity_per_mole: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boiling_point_k: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_heat_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condensable: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SegmentDef {
    pub id: u32,
    pub capacity_l: f64,
}

/// A network present before the first tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<u32>,
    pub segments: Vec<SegmentDef>,
    /// Species key -> moles of gas.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub gas: BTreeMap<String, f64>,
    /// Species key -> grams of liquid.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub liquid: BTreeMap<String, f64>,
    #[serde(default = "default_temperature")]
    pub temperature_k: f64,
}

/// Lifecycle event applied at the start of `tick`, before equilibration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptedEventDef {
    pub tick: u32,
    pub action: EventActionDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum EventActionDef {
    Create {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        anchor: Option<u32>,
        segments: Vec<SegmentDef>,
    },
    Join {
        /// Any segment of the network being joined.
        network_of: u32,
        segment: SegmentDef,
    },
    Leave {
        segment: u32,
        capacity_l: f64,
        #[serde(default)]
        destroying: bool,
    },
    Split {
        network_of: u32,
        groups: Vec<Vec<u32>>,
    },
    Merge {
        /// One member segment per network to merge.
        networks_of: Vec<u32>,
    },
}

impl EventActionDef {
    /// Segments this action refers to without declaring them.
    pub fn referenced_segments(&self) -> Vec<u32> {
        match self {
            EventActionDef::Create { .. } => Vec::new(),
            EventActionDef::Join { network_of, .. } => vec![*network_of],
            EventActionDef::Leave { segment, .. } => vec![*segment],
            EventActionDef::Split { network_of, groups } => std::iter::once(*network_of)
                .chain(groups.iter().flatten().copied())
                .collect(),
            EventActionDef::Merge { networks_of } => networks_of.clone(),
        }
    }

    /// Segments this action brings into the simulation.
    pub fn declared_segments(&self) -> &[SegmentDef] {
        match self {
            EventActionDef::Create { segments, .. } => segments,
            EventActionDef::Join { segment, .. } => std::slice::from_ref(segment),
            _ => &[],
        }
    }
}
