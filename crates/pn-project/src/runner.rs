//! Turning a scenario into live networks and running it.

use std::collections::BTreeMap;
use std::sync::Arc;

use pn_chem::{Mixture, Solution, SpeciesCatalog};
use pn_core::units::{as_kelvin, as_kpa, as_liters};
use pn_core::{GridId, NetworkId, SegmentId};
use pn_net::{NetworkEvent, NetworkVolume, NoReactions, PipeNetworks};
use serde::Serialize;
use tracing::{debug, info};

use crate::schema::{EventActionDef, Scenario, SegmentDef};
use crate::validate::{catalog_overrides, parse_species, solver_config, validate_scenario};
use crate::{ProjectError, ProjectResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Overrides the scenario's tick count.
    pub ticks: Option<u32>,
    /// Equilibrate networks on the rayon pool.
    pub parallel: bool,
}

/// Final state of one network, flattened for printing and JSON output.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NetworkSummary {
    pub network: u32,
    pub anchor: Option<u32>,
    pub segments: Vec<u32>,
    pub capacity_l: f64,
    pub pressure_kpa: f64,
    pub temperature_k: f64,
    pub gas_volume_l: f64,
    pub liquid_volume_l: f64,
    /// Species key -> moles.
    pub gas: BTreeMap<String, f64>,
    /// Species key -> grams.
    pub liquid: BTreeMap<String, f64>,
}

impl NetworkSummary {
    fn of(volume: &NetworkVolume, catalog: &SpeciesCatalog) -> Self {
        let snapshot = volume.snapshot();
        Self {
            network: volume.id().index(),
            anchor: volume.anchor().map(GridId::index),
            segments: volume.members().map(|(s, _)| s.index()).collect(),
            capacity_l: volume.total_capacity(),
            pressure_kpa: as_kpa(snapshot.pressure),
            temperature_k: as_kelvin(snapshot.temperature),
            gas_volume_l: as_liters(snapshot.volume),
            liquid_volume_l: volume.solution().volume(catalog),
            gas: volume
                .mixture()
                .iter()
                .map(|(s, n)| (s.key().to_string(), n))
                .collect(),
            liquid: volume
                .solution()
                .iter()
                .map(|(s, g)| (s.key().to_string(), g))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub scenario: String,
    pub ticks: u32,
    pub events_applied: usize,
    /// Network-ticks where the solver stopped at its iteration cap.
    pub unconverged: usize,
    pub networks: Vec<NetworkSummary>,
}

/// A finished run: the live networks plus the summary built from them.
#[derive(Debug)]
pub struct ScenarioRun {
    pub networks: PipeNetworks,
    pub summary: RunSummary,
}

/// Networks as declared in the scenario, before any tick.
pub fn build_networks(scenario: &Scenario) -> ProjectResult<PipeNetworks> {
    let overrides = catalog_overrides(scenario)?;
    let catalog = SpeciesCatalog::builtin().rebuilt(&overrides)?;
    let mut nets = PipeNetworks::new(Arc::new(catalog), solver_config(&scenario.solver)?)?;

    for (idx, def) in scenario.networks.iter().enumerate() {
        let context = format!("networks[{idx}]");
        let mut gas = Mixture::new(0.0, def.temperature_k)?;
        for (name, &moles) in &def.gas {
            gas.set_moles(parse_species(name, &context)?, moles)?;
        }
        let mut liquid = Solution::new(def.temperature_k)?;
        for (name, &grams) in &def.liquid {
            liquid.add_mass(parse_species(name, &context)?, grams)?;
        }
        let id = nets.create_filled(
            def.anchor.map(GridId::from_index),
            &segments(&def.segments),
            gas,
            liquid,
        )?;
        debug!(network = %id, index = idx, "declared network");
    }
    Ok(nets)
}

fn segments(defs: &[SegmentDef]) -> Vec<(SegmentId, f64)> {
    defs.iter()
        .map(|s| (SegmentId::from_index(s.id), s.capacity_l))
        .collect()
}

fn network_of(nets: &PipeNetworks, segment: u32, tick: u32) -> ProjectResult<NetworkId> {
    nets.network_of(SegmentId::from_index(segment))
        .ok_or(ProjectError::UnresolvedSegment { segment, tick })
}

/// Translate a scripted action into an event against the current networks.
pub fn resolve_event(
    nets: &PipeNetworks,
    action: &EventActionDef,
    tick: u32,
) -> ProjectResult<NetworkEvent> {
    let event = match action {
        EventActionDef::Create { anchor, segments: defs } => NetworkEvent::Created {
            anchor: anchor.map(GridId::from_index),
            segments: segments(defs),
        },
        EventActionDef::Join {
            network_of: member,
            segment,
        } => NetworkEvent::SegmentJoined {
            network: network_of(nets, *member, tick)?,
            segment: SegmentId::from_index(segment.id),
            capacity: segment.capacity_l,
        },
        EventActionDef::Leave {
            segment,
            capacity_l,
            destroying,
        } => NetworkEvent::SegmentLeft {
            network: network_of(nets, *segment, tick)?,
            segment: SegmentId::from_index(*segment),
            capacity: *capacity_l,
            destroying: *destroying,
        },
        EventActionDef::Split {
            network_of: member,
            groups,
        } => NetworkEvent::GroupSplit {
            network: network_of(nets, *member, tick)?,
            groups: groups
                .iter()
                .map(|g| g.iter().copied().map(SegmentId::from_index).collect())
                .collect(),
        },
        EventActionDef::Merge { networks_of } => NetworkEvent::GroupMerged {
            networks: networks_of
                .iter()
                .map(|&member| network_of(nets, member, tick))
                .collect::<ProjectResult<_>>()?,
        },
    };
    Ok(event)
}

/// Build the scenario's networks, then apply scripted events and tick.
pub fn run_scenario(scenario: &Scenario, opts: RunOptions) -> ProjectResult<ScenarioRun> {
    validate_scenario(scenario)?;
    let mut nets = build_networks(scenario)?;
    let ticks = opts.ticks.unwrap_or(scenario.ticks);
    info!(
        scenario = %scenario.name,
        ticks,
        networks = nets.registry().len(),
        parallel = opts.parallel,
        "running scenario"
    );

    let mut events_applied = 0;
    let mut unconverged = 0;
    for tick in 0..ticks {
        for scripted in scenario.events.iter().filter(|e| e.tick == tick) {
            let event = resolve_event(&nets, &scripted.action, tick)?;
            let created = nets.apply(event)?;
            events_applied += 1;
            debug!(tick, created = created.len(), "applied scripted event");
        }
        let report = if opts.parallel {
            nets.tick_parallel(&mut NoReactions)?
        } else {
            nets.tick(&mut NoReactions)?
        };
        unconverged += report.equilibrium.len() - report.converged();
    }

    let summary = RunSummary {
        scenario: scenario.name.clone(),
        ticks,
        events_applied,
        unconverged,
        networks: nets
            .registry()
            .iter()
            .map(|v| NetworkSummary::of(v, nets.catalog()))
            .collect(),
    };
    info!(
        networks = summary.networks.len(),
        events = events_applied,
        unconverged,
        "scenario finished"
    );
    Ok(ScenarioRun {
        networks: nets,
        summary,
    })
}
