//! One connected pipe network: its member segments and the gas/liquid they share.
//!
//! Join and leave adjust a live volume in place. Split and merge never touch
//! their inputs; they build fresh generations with new [`NetworkId`]s and the
//! caller drops the originals. Conservation is checked where a generation is
//! constructed.

use std::collections::{BTreeMap, BTreeSet};

use pn_chem::{Mixture, Solution, Species, SpeciesCatalog};
use pn_core::numeric::{Tolerances, ensure_positive, nearly_equal};
use pn_core::{GridId, NetworkId, NetworkIdAllocator, SegmentId};
use tracing::{debug, warn};

use crate::error::{NetError, NetResult};
use crate::snapshot::NetworkSnapshot;

const CAPACITY_TOL: Tolerances = Tolerances {
    abs: 1e-9,
    rel: 1e-9,
};

/// Shared contents and capacity of one connected set of segments.
///
/// Invariant after every operation: `mixture.volume() == max(0, total_capacity - solution.volume())`.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkVolume {
    id: NetworkId,
    anchor: Option<GridId>,
    /// Segment -> capacity (L) recorded when it joined.
    members: BTreeMap<SegmentId, f64>,
    total_capacity: f64,
    mixture: Mixture,
    solution: Solution,
}

impl NetworkVolume {
    /// Empty network at 20 °C made of `segments`.
    pub fn new(
        id: NetworkId,
        anchor: Option<GridId>,
        segments: &[(SegmentId, f64)],
    ) -> NetResult<Self> {
        let members = collect_members(segments)?;
        let total_capacity: f64 = members.values().sum();
        let mut mixture = Mixture::vacuum();
        mixture.set_volume(total_capacity)?;
        Ok(Self {
            id,
            anchor,
            members,
            total_capacity,
            mixture,
            solution: Solution::default(),
        })
    }

    /// Network made of `segments` already holding `mixture` and `solution`.
    ///
    /// The mixture's volume is overwritten from the capacity left over by the liquid.
    pub fn with_contents(
        id: NetworkId,
        anchor: Option<GridId>,
        segments: &[(SegmentId, f64)],
        mixture: Mixture,
        solution: Solution,
        catalog: &SpeciesCatalog,
    ) -> NetResult<Self> {
        let members = collect_members(segments)?;
        let total_capacity = members.values().sum();
        let mut volume = Self {
            id,
            anchor,
            members,
            total_capacity,
            mixture,
            solution,
        };
        volume.refresh_gas_volume(catalog)?;
        Ok(volume)
    }

    pub fn id(&self) -> NetworkId {
        self.id
    }

    pub fn anchor(&self) -> Option<GridId> {
        self.anchor
    }

    /// Total capacity in liters.
    pub fn total_capacity(&self) -> f64 {
        self.total_capacity
    }

    pub fn mixture(&self) -> &Mixture {
        &self.mixture
    }

    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    pub(crate) fn mixture_mut(&mut self) -> &mut Mixture {
        &mut self.mixture
    }

    pub(crate) fn phases_mut(&mut self) -> (&mut Mixture, &mut Solution) {
        (&mut self.mixture, &mut self.solution)
    }

    pub fn contains(&self, segment: SegmentId) -> bool {
        self.members.contains_key(&segment)
    }

    pub fn segment_capacity(&self, segment: SegmentId) -> Option<f64> {
        self.members.get(&segment).copied()
    }

    /// Members with their capacities, in segment order.
    pub fn members(&self) -> impl Iterator<Item = (SegmentId, f64)> + '_ {
        self.members.iter().map(|(&s, &c)| (s, c))
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// True once the last segment has left; the volume is then a bookkeeping remnant.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Grams of `species` across both phases.
    pub fn species_mass(&self, species: Species, catalog: &SpeciesCatalog) -> f64 {
        self.mixture.moles(species) * catalog.get(species).molar_mass + self.solution.mass(species)
    }

    /// Sensible heat H·T of both phases, J.
    pub fn thermal_energy(&self, catalog: &SpeciesCatalog) -> f64 {
        self.mixture.thermal_energy(catalog) + self.solution.thermal_energy(catalog)
    }

    /// Recompute the gas volume from what the liquid leaves free. Returns the gas volume.
    pub fn refresh_gas_volume(&mut self, catalog: &SpeciesCatalog) -> NetResult<f64> {
        let liquid = self.solution.volume(catalog);
        if liquid > self.total_capacity {
            warn!(
                network = %self.id,
                liquid,
                capacity = self.total_capacity,
                "liquid exceeds network capacity; gas volume clamped to zero"
            );
        }
        let gas = (self.total_capacity - liquid).max(0.0);
        self.mixture.set_volume(gas)?;
        Ok(gas)
    }

    /// Add an empty segment. Contents are unchanged, only free capacity grows.
    pub fn add_segment(
        &mut self,
        segment: SegmentId,
        capacity: f64,
        catalog: &SpeciesCatalog,
    ) -> NetResult<()> {
        let capacity = ensure_positive(capacity, "segment capacity")?;
        if self.members.contains_key(&segment) {
            return Err(NetError::SegmentAlreadyMember { segment });
        }
        self.members.insert(segment, capacity);
        self.total_capacity += capacity;
        self.refresh_gas_volume(catalog)?;
        Ok(())
    }

    /// Remove a member segment.
    ///
    /// With `destroying` the gas and liquid trapped in the segment leave the
    /// system: both phases are scaled by the capacity fraction that remains.
    /// Otherwise the segment moves to another network as empty capacity and
    /// everything it held stays here. The last segment may only leave by
    /// destruction; a network moving wholesale into another is a merge.
    ///
    /// On error nothing changes.
    pub fn remove_segment(
        &mut self,
        segment: SegmentId,
        capacity: f64,
        destroying: bool,
        catalog: &SpeciesCatalog,
    ) -> NetResult<()> {
        let recorded = self
            .segment_capacity(segment)
            .ok_or(NetError::UnknownSegment { segment })?;
        let capacity = ensure_positive(capacity, "segment capacity")?;
        if capacity > self.total_capacity && !nearly_equal(capacity, self.total_capacity, CAPACITY_TOL)
        {
            return Err(NetError::CapacityExceeded {
                requested: capacity,
                available: self.total_capacity,
            });
        }
        if !nearly_equal(recorded, capacity, CAPACITY_TOL) {
            return Err(NetError::CapacityMismatch {
                segment,
                recorded,
                given: capacity,
            });
        }
        let last = self.members.len() == 1;
        if last && !destroying {
            return Err(NetError::InvalidArg {
                what: "the last segment can only leave by destruction",
            });
        }

        if destroying {
            let keep = if last {
                0.0
            } else {
                ((self.total_capacity - recorded) / self.total_capacity).clamp(0.0, 1.0)
            };
            self.mixture.scale(keep)?;
            self.solution.scale(keep)?;
        }

        self.members.remove(&segment);
        // Re-summing keeps the remaining capacity exact instead of accumulating subtraction error.
        self.total_capacity = self.members.values().sum();
        self.refresh_gas_volume(catalog)?;
        Ok(())
    }

    /// Partition this network into the disjoint `groups`, which must cover every member.
    ///
    /// Each child receives capacity equal to its members' capacities and a
    /// matching share of every species in both phases. The last child absorbs
    /// the rounding remainder, so per-species totals are preserved. All
    /// children start at the parent's temperature.
    pub fn split(
        &self,
        groups: &[Vec<SegmentId>],
        ids: &mut NetworkIdAllocator,
        catalog: &SpeciesCatalog,
    ) -> NetResult<Vec<NetworkVolume>> {
        if groups.len() < 2 {
            return Err(NetError::InvalidGrouping {
                what: "split needs at least two groups",
            });
        }

        let mut seen = BTreeSet::new();
        let mut child_members = Vec::with_capacity(groups.len());
        for group in groups {
            if group.is_empty() {
                return Err(NetError::InvalidGrouping {
                    what: "empty group",
                });
            }
            let mut segments = Vec::with_capacity(group.len());
            for &segment in group {
                let capacity = self
                    .segment_capacity(segment)
                    .ok_or(NetError::UnknownSegment { segment })?;
                if !seen.insert(segment) {
                    return Err(NetError::InvalidGrouping {
                        what: "segment listed in more than one group",
                    });
                }
                segments.push((segment, capacity));
            }
            child_members.push(segments);
        }
        if seen.len() != self.members.len() {
            return Err(NetError::InvalidGrouping {
                what: "groups do not cover every member",
            });
        }

        let shares: Vec<f64> = child_members
            .iter()
            .map(|segments| segments.iter().map(|(_, c)| c).sum::<f64>() / self.total_capacity)
            .collect();
        let gas = partition(&self.mixture.moles_by_species(), &shares);
        let liquid = partition(&self.solution.mass_by_species(), &shares);

        let mut children = Vec::with_capacity(groups.len());
        for ((segments, child_gas), child_liquid) in child_members.iter().zip(&gas).zip(&liquid) {
            let mut mixture = Mixture::new(0.0, self.mixture.temperature())?;
            let mut solution = Solution::new(self.solution.temperature())?;
            for species in Species::ALL {
                mixture.set_moles(species, child_gas[species.index()])?;
                solution.add_mass(species, child_liquid[species.index()])?;
            }
            children.push(Self::with_contents(
                ids.allocate()?,
                self.anchor,
                segments,
                mixture,
                solution,
                catalog,
            )?);
        }

        debug!(
            parent = %self.id,
            children = children.len(),
            "split network"
        );
        Ok(children)
    }

    /// Combine `parts` into one new network `id`.
    ///
    /// Capacities, moles and liquid masses add up. The common temperature is
    /// the heat-capacity weighted mean over both phases of every part, or the
    /// plain mean of the parts' temperatures when nothing holds heat.
    pub fn merge(
        parts: &[&NetworkVolume],
        id: NetworkId,
        catalog: &SpeciesCatalog,
    ) -> NetResult<NetworkVolume> {
        if parts.is_empty() {
            return Err(NetError::InvalidArg {
                what: "merge needs at least one network",
            });
        }

        let mut seen = BTreeSet::new();
        let mut segments = Vec::new();
        for part in parts {
            for (segment, capacity) in part.members() {
                if !seen.insert(segment) {
                    return Err(NetError::SegmentAlreadyMember { segment });
                }
                segments.push((segment, capacity));
            }
        }

        let mut mixture = Mixture::vacuum();
        let mut solution = Solution::default();
        let mut heat_capacity = 0.0;
        let mut energy = 0.0;
        for part in parts {
            let h_gas = part.mixture.heat_capacity(catalog);
            let h_liquid = part.solution.heat_capacity(catalog);
            heat_capacity += h_gas + h_liquid;
            energy += h_gas * part.mixture.temperature() + h_liquid * part.solution.temperature();
            mixture.absorb(&part.mixture);
            solution.absorb(&part.solution);
        }

        let temperature = if heat_capacity > 0.0 {
            energy / heat_capacity
        } else {
            parts.iter().map(|p| p.mixture.temperature()).sum::<f64>() / parts.len() as f64
        };
        mixture.set_temperature(temperature)?;
        solution.set_temperature(temperature)?;

        let anchor = parts.iter().find_map(|p| p.anchor);
        if parts
            .iter()
            .any(|p| p.anchor.is_some() && p.anchor != anchor)
        {
            warn!(?anchor, "merging networks from different anchors");
        }

        let merged = Self::with_contents(id, anchor, &segments, mixture, solution, catalog)?;
        debug!(
            network = %merged.id,
            inputs = parts.len(),
            temperature,
            "merged networks"
        );
        Ok(merged)
    }

    /// Read-only pressure/temperature/volume for display.
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot::of(self.id, &self.mixture)
    }
}

fn collect_members(segments: &[(SegmentId, f64)]) -> NetResult<BTreeMap<SegmentId, f64>> {
    if segments.is_empty() {
        return Err(NetError::InvalidArg {
            what: "a network needs at least one segment",
        });
    }
    let mut members = BTreeMap::new();
    for &(segment, capacity) in segments {
        let capacity = ensure_positive(capacity, "segment capacity")?;
        if members.insert(segment, capacity).is_some() {
            return Err(NetError::SegmentAlreadyMember { segment });
        }
    }
    Ok(members)
}

/// Split per-species totals by `shares`; the last share takes the remainder.
fn partition(totals: &[f64; Species::COUNT], shares: &[f64]) -> Vec<[f64; Species::COUNT]> {
    let mut out = vec![[0.0; Species::COUNT]; shares.len()];
    let Some(last) = shares.len().checked_sub(1) else {
        return out;
    };
    for (s, &total) in totals.iter().enumerate() {
        let mut handed_out = 0.0;
        for (child, share) in out.iter_mut().zip(shares).take(last) {
            let part = total * share;
            child[s] = part;
            handed_out += part;
        }
        out[last][s] = (total - handed_out).max(0.0);
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn network(capacities: &[f64], moles: &[f64], grams: &[f64], t: f64) -> NetworkVolume {
        let cat = SpeciesCatalog::builtin();
        let segments: Vec<_> = capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| (SegmentId::from_index(i as u32), c))
            .collect();
        let mut mixture = Mixture::new(0.0, t).unwrap();
        let mut solution = Solution::new(t).unwrap();
        for (i, species) in Species::ALL.iter().enumerate() {
            mixture.set_moles(*species, moles[i]).unwrap();
            solution.add_mass(*species, grams[i]).unwrap();
        }
        NetworkVolume::with_contents(
            NetworkId::from_index(0),
            None,
            &segments,
            mixture,
            solution,
            &cat,
        )
        .unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        nearly_equal(a, b, Tolerances { abs: 1e-9, rel: 1e-9 })
    }

    proptest! {
        #[test]
        fn split_conserves_mass_and_capacity(
            capacities in prop::collection::vec(1.0_f64..500.0, 2..8),
            moles in prop::collection::vec(0.0_f64..1000.0, Species::COUNT),
            grams in prop::collection::vec(0.0_f64..100.0, Species::COUNT),
            cut in 1_usize..7,
            t in 50.0_f64..1000.0,
        ) {
            let cat = SpeciesCatalog::builtin();
            let parent = network(&capacities, &moles, &grams, t);
            let cut = cut.min(capacities.len() - 1);
            let all: Vec<SegmentId> = parent.members().map(|(s, _)| s).collect();
            let groups = vec![all[..cut].to_vec(), all[cut..].to_vec()];

            let mut ids = NetworkIdAllocator::new();
            ids.allocate().unwrap();
            let children = parent.split(&groups, &mut ids, &cat).unwrap();

            let capacity: f64 = children.iter().map(|c| c.total_capacity()).sum();
            prop_assert!(close(capacity, parent.total_capacity()));
            for species in Species::ALL {
                let gas: f64 = children.iter().map(|c| c.mixture().moles(species)).sum();
                let liquid: f64 = children.iter().map(|c| c.solution().mass(species)).sum();
                prop_assert!(close(gas, parent.mixture().moles(species)));
                prop_assert!(close(liquid, parent.solution().mass(species)));
            }
        }

        #[test]
        fn merge_conserves_mass_capacity_and_energy(
            caps_a in prop::collection::vec(1.0_f64..500.0, 1..4),
            caps_b in prop::collection::vec(1.0_f64..500.0, 1..4),
            moles in prop::collection::vec(0.0_f64..1000.0, Species::COUNT),
            grams in prop::collection::vec(0.0_f64..100.0, Species::COUNT),
            t_a in 50.0_f64..1000.0,
            t_b in 50.0_f64..1000.0,
        ) {
            let cat = SpeciesCatalog::builtin();
            let a = network(&caps_a, &moles, &grams, t_a);
            // Offset b's segment ids past a's.
            let b_segments: Vec<_> = caps_b
                .iter()
                .enumerate()
                .map(|(i, &c)| (SegmentId::from_index(100 + i as u32), c))
                .collect();
            let mut b = NetworkVolume::with_contents(
                NetworkId::from_index(1),
                None,
                &b_segments,
                a.mixture().clone(),
                a.solution().clone(),
                &cat,
            )
            .unwrap();
            b.mixture.set_temperature(t_b).unwrap();
            b.solution.set_temperature(t_b).unwrap();

            let merged = NetworkVolume::merge(&[&a, &b], NetworkId::from_index(2), &cat).unwrap();
            prop_assert!(close(merged.total_capacity(), a.total_capacity() + b.total_capacity()));
            for species in Species::ALL {
                prop_assert!(close(
                    merged.mixture().moles(species),
                    a.mixture().moles(species) + b.mixture().moles(species)
                ));
                prop_assert!(close(
                    merged.solution().mass(species),
                    a.solution().mass(species) + b.solution().mass(species)
                ));
            }
            let before = a.thermal_energy(&cat) + b.thermal_energy(&cat);
            let tol = Tolerances { abs: 1e-6, rel: 1e-9 };
            prop_assert!(nearly_equal(merged.thermal_energy(&cat), before, tol));
        }
    }
}
