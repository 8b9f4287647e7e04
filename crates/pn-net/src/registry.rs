//! Live networks, indexed by id and by the grid they sit on.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pn_core::{GridId, NetworkId};

use crate::error::{NetError, NetResult};
use crate::volume::NetworkVolume;

/// Storage for every live [`NetworkVolume`].
///
/// No physics happens here. A missing entry just means "no network".
#[derive(Debug, Default)]
pub struct NetworkRegistry {
    volumes: BTreeMap<NetworkId, NetworkVolume>,
    by_anchor: HashMap<GridId, BTreeSet<NetworkId>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, volume: NetworkVolume) -> NetResult<NetworkId> {
        let id = volume.id();
        if self.volumes.contains_key(&id) {
            return Err(NetError::InvalidArg {
                what: "network id already registered",
            });
        }
        if let Some(anchor) = volume.anchor() {
            self.by_anchor.entry(anchor).or_default().insert(id);
        }
        self.volumes.insert(id, volume);
        Ok(id)
    }

    pub fn unregister(&mut self, id: NetworkId) -> Option<NetworkVolume> {
        let volume = self.volumes.remove(&id)?;
        if let Some(anchor) = volume.anchor()
            && let Some(ids) = self.by_anchor.get_mut(&anchor)
        {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_anchor.remove(&anchor);
            }
        }
        Some(volume)
    }

    pub fn get(&self, id: NetworkId) -> Option<&NetworkVolume> {
        self.volumes.get(&id)
    }

    pub fn get_mut(&mut self, id: NetworkId) -> Option<&mut NetworkVolume> {
        self.volumes.get_mut(&id)
    }

    pub fn contains(&self, id: NetworkId) -> bool {
        self.volumes.contains_key(&id)
    }

    /// Networks anchored on `anchor`, in id order.
    pub fn at(&self, anchor: GridId) -> impl Iterator<Item = &NetworkVolume> + '_ {
        self.by_anchor
            .get(&anchor)
            .into_iter()
            .flatten()
            .filter_map(|id| self.volumes.get(id))
    }

    pub fn anchors(&self) -> impl Iterator<Item = GridId> + '_ {
        self.by_anchor.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkVolume> + '_ {
        self.volumes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NetworkVolume> + '_ {
        self.volumes.values_mut()
    }

    pub(crate) fn volumes_mut(&mut self) -> &mut BTreeMap<NetworkId, NetworkVolume> {
        &mut self.volumes
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}
