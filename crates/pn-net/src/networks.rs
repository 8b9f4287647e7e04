//! Per-tick driver: applies lifecycle events, equilibrates, hands gas to reactions.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use pn_chem::{Mixture, PropsOverride, Solution, Species, SpeciesCatalog};
use pn_core::{GridId, NetworkId, NetworkIdAllocator, SegmentId};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::equilibrium::{EquilibriumReport, EquilibriumSolver, SolverConfig};
use crate::error::{NetError, NetResult};
use crate::events::NetworkEvent;
use crate::registry::NetworkRegistry;
use crate::snapshot::NetworkSnapshot;
use crate::volume::NetworkVolume;

/// Reaction step run on each anchored network's gas after equilibration.
pub trait Reactor {
    fn react(
        &mut self,
        anchor: GridId,
        network: NetworkId,
        mixture: &mut Mixture,
        catalog: &SpeciesCatalog,
    );
}

/// Reactor that leaves every mixture alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReactions;

impl Reactor for NoReactions {
    fn react(&mut self, _: GridId, _: NetworkId, _: &mut Mixture, _: &SpeciesCatalog) {}
}

/// What one tick did.
#[derive(Debug, Default, Clone)]
pub struct TickReport {
    pub equilibrium: BTreeMap<NetworkId, EquilibriumReport>,
    /// Networks handed to the reactor.
    pub reacted: usize,
}

impl TickReport {
    pub fn converged(&self) -> usize {
        self.equilibrium.values().filter(|r| r.converged).count()
    }
}

/// All pipe networks of a simulation.
///
/// Owns the registry, the shared species catalog and the segment index that
/// keeps every segment in at most one network. Every mutating call either
/// fully applies or returns an error with nothing changed.
#[derive(Debug)]
pub struct PipeNetworks {
    registry: NetworkRegistry,
    catalog: Arc<SpeciesCatalog>,
    solver: EquilibriumSolver,
    ids: NetworkIdAllocator,
    segments: HashMap<SegmentId, NetworkId>,
}

impl PipeNetworks {
    pub fn new(catalog: Arc<SpeciesCatalog>, config: SolverConfig) -> NetResult<Self> {
        catalog.validate()?;
        Ok(Self {
            registry: NetworkRegistry::new(),
            catalog,
            solver: EquilibriumSolver::new(config)?,
            ids: NetworkIdAllocator::new(),
            segments: HashMap::new(),
        })
    }

    pub fn catalog(&self) -> &Arc<SpeciesCatalog> {
        &self.catalog
    }

    pub fn solver(&self) -> &EquilibriumSolver {
        &self.solver
    }

    pub fn registry(&self) -> &NetworkRegistry {
        &self.registry
    }

    pub fn get(&self, network: NetworkId) -> Option<&NetworkVolume> {
        self.registry.get(network)
    }

    /// The network currently holding `segment`, if any.
    pub fn network_of(&self, segment: SegmentId) -> Option<NetworkId> {
        self.segments.get(&segment).copied()
    }

    pub fn snapshot(&self, network: NetworkId) -> Option<NetworkSnapshot> {
        self.registry.get(network).map(NetworkVolume::snapshot)
    }

    /// Gas of every network on `anchor`, as handed to the reaction step.
    pub fn mixtures_at(&self, anchor: GridId) -> impl Iterator<Item = (NetworkId, &Mixture)> + '_ {
        self.registry.at(anchor).map(|v| (v.id(), v.mixture()))
    }

    /// Swap in a new catalog. Liquid densities may change, so gas volumes are refreshed.
    pub fn replace_catalog(&mut self, catalog: Arc<SpeciesCatalog>) -> NetResult<()> {
        catalog.validate()?;
        self.catalog = catalog;
        for volume in self.registry.iter_mut() {
            volume.refresh_gas_volume(&self.catalog)?;
        }
        info!(networks = self.registry.len(), "species catalog replaced");
        Ok(())
    }

    /// Rebuild the catalog from the current one plus `overrides`.
    pub fn rebuild_catalog(&mut self, overrides: &[(Species, PropsOverride)]) -> NetResult<()> {
        let rebuilt = self.catalog.rebuilt(overrides)?;
        self.replace_catalog(Arc::new(rebuilt))
    }

    /// Register a new, empty network made of `segments`.
    pub fn create(
        &mut self,
        anchor: Option<GridId>,
        segments: &[(SegmentId, f64)],
    ) -> NetResult<NetworkId> {
        self.create_filled(anchor, segments, Mixture::vacuum(), Solution::default())
    }

    /// Register a new network that already holds gas and liquid.
    pub fn create_filled(
        &mut self,
        anchor: Option<GridId>,
        segments: &[(SegmentId, f64)],
        mixture: Mixture,
        solution: Solution,
    ) -> NetResult<NetworkId> {
        self.ensure_unassigned(segments.iter().map(|(s, _)| *s))?;
        let volume = NetworkVolume::with_contents(
            self.ids.allocate()?,
            anchor,
            segments,
            mixture,
            solution,
            &self.catalog,
        )?;
        let id = self.install(volume)?;
        debug!(network = %id, segments = segments.len(), ?anchor, "created network");
        Ok(id)
    }

    pub fn join(
        &mut self,
        network: NetworkId,
        segment: SegmentId,
        capacity: f64,
    ) -> NetResult<()> {
        self.ensure_unassigned([segment])?;
        let volume = self
            .registry
            .get_mut(network)
            .ok_or(NetError::UnknownNetwork { network })?;
        volume.add_segment(segment, capacity, &self.catalog)?;
        self.segments.insert(segment, network);
        Ok(())
    }

    /// Remove `segment` from `network`. Returns true when that emptied and destroyed the network.
    pub fn leave(
        &mut self,
        network: NetworkId,
        segment: SegmentId,
        capacity: f64,
        destroying: bool,
    ) -> NetResult<bool> {
        if self.network_of(segment) != Some(network) {
            return Err(NetError::UnknownSegment { segment });
        }
        let volume = self
            .registry
            .get_mut(network)
            .ok_or(NetError::UnknownNetwork { network })?;
        volume.remove_segment(segment, capacity, destroying, &self.catalog)?;
        self.segments.remove(&segment);

        if volume.is_empty() {
            self.registry.unregister(network);
            debug!(%network, "destroyed empty network");
            return Ok(true);
        }
        Ok(false)
    }

    /// Replace `network` by one fresh network per group.
    pub fn split(
        &mut self,
        network: NetworkId,
        groups: &[Vec<SegmentId>],
    ) -> NetResult<Vec<NetworkId>> {
        let parent = self
            .registry
            .get(network)
            .ok_or(NetError::UnknownNetwork { network })?;
        let children = parent.split(groups, &mut self.ids, &self.catalog)?;

        self.retire(network);
        children
            .into_iter()
            .map(|child| self.install(child))
            .collect()
    }

    /// Replace `networks` by one fresh network holding all of them.
    pub fn merge(&mut self, networks: &[NetworkId]) -> NetResult<NetworkId> {
        if networks.len() < 2 {
            return Err(NetError::InvalidArg {
                what: "merge needs at least two networks",
            });
        }
        let distinct: BTreeSet<_> = networks.iter().collect();
        if distinct.len() != networks.len() {
            return Err(NetError::InvalidArg {
                what: "network listed twice in merge",
            });
        }

        let parts = networks
            .iter()
            .map(|&network| {
                self.registry
                    .get(network)
                    .ok_or(NetError::UnknownNetwork { network })
            })
            .collect::<NetResult<Vec<_>>>()?;
        let merged = NetworkVolume::merge(&parts, self.ids.allocate()?, &self.catalog)?;

        for &network in networks {
            self.retire(network);
        }
        self.install(merged)
    }

    /// Apply one lifecycle event. Returns the ids of networks it created.
    pub fn apply(&mut self, event: NetworkEvent) -> NetResult<Vec<NetworkId>> {
        let kind = event.kind();
        let result = match event {
            NetworkEvent::Created { anchor, segments } => {
                self.create(anchor, &segments).map(|id| vec![id])
            }
            NetworkEvent::SegmentJoined {
                network,
                segment,
                capacity,
            } => self.join(network, segment, capacity).map(|()| Vec::new()),
            NetworkEvent::SegmentLeft {
                network,
                segment,
                capacity,
                destroying,
            } => self
                .leave(network, segment, capacity, destroying)
                .map(|_| Vec::new()),
            NetworkEvent::GroupSplit { network, groups } => self.split(network, &groups),
            NetworkEvent::GroupMerged { networks } => self.merge(&networks).map(|id| vec![id]),
        };
        result.inspect_err(|err| warn!(event = kind, %err, "rejected network event"))
    }

    /// Equilibrate every network in id order, then run the reaction step.
    pub fn tick<R: Reactor>(&mut self, reactor: &mut R) -> NetResult<TickReport> {
        let mut report = TickReport::default();
        for volume in self.registry.iter_mut() {
            let eq = self.solver.equilibrate(volume, &self.catalog)?;
            report.equilibrium.insert(volume.id(), eq);
        }
        report.reacted = self.react(reactor);
        Ok(report)
    }

    /// Like [`tick`](Self::tick), equilibrating networks on the rayon pool.
    ///
    /// Volumes never alias each other, so each can be solved independently.
    /// The reaction step still runs sequentially.
    pub fn tick_parallel<R: Reactor>(&mut self, reactor: &mut R) -> NetResult<TickReport> {
        let solver = &self.solver;
        let catalog: &SpeciesCatalog = &self.catalog;
        let results: Vec<(NetworkId, NetResult<EquilibriumReport>)> = self
            .registry
            .volumes_mut()
            .par_iter_mut()
            .map(|(&id, volume)| (id, solver.equilibrate(volume, catalog)))
            .collect();

        let mut report = TickReport::default();
        for (id, eq) in results {
            report.equilibrium.insert(id, eq?);
        }
        report.reacted = self.react(reactor);
        Ok(report)
    }

    fn react<R: Reactor>(&mut self, reactor: &mut R) -> usize {
        let mut reacted = 0;
        for volume in self.registry.iter_mut() {
            let Some(anchor) = volume.anchor() else {
                continue;
            };
            let id = volume.id();
            reactor.react(anchor, id, volume.mixture_mut(), &self.catalog);
            reacted += 1;
        }
        reacted
    }

    fn ensure_unassigned(&self, segments: impl IntoIterator<Item = SegmentId>) -> NetResult<()> {
        for segment in segments {
            if self.segments.contains_key(&segment) {
                return Err(NetError::SegmentAlreadyMember { segment });
            }
        }
        Ok(())
    }

    fn install(&mut self, volume: NetworkVolume) -> NetResult<NetworkId> {
        let id = volume.id();
        for (segment, _) in volume.members() {
            self.segments.insert(segment, id);
        }
        self.registry.register(volume)
    }

    fn retire(&mut self, network: NetworkId) {
        if let Some(volume) = self.registry.unregister(network) {
            for (segment, _) in volume.members() {
                if self.segments.get(&segment) == Some(&network) {
                    self.segments.remove(&segment);
                }
            }
        }
    }
}
