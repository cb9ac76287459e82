//! Local and remote stroke storage.

use crate::error::{SessionError, SessionResult};
use crate::path::Path;
use kurbo::Point;
use std::collections::HashMap;

/// All strokes known to this client.
///
/// Local paths belong to this participant. Remote paths are mirrored from
/// peers in arrival order; a remote path may only grow while its author has
/// it in progress, which is tracked per peer so that concurrent authors never
/// write into each other's strokes.
#[derive(Debug, Clone, Default)]
pub struct PathStore {
    local: Vec<Path>,
    remote: Vec<Path>,
    /// Peer username -> index in `remote` of that peer's in-progress stroke.
    active_remote: HashMap<String, usize>,
}

impl PathStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Local strokes in drawing order.
    pub fn local_paths(&self) -> &[Path] {
        &self.local
    }

    /// Remote strokes in arrival order.
    pub fn remote_paths(&self) -> &[Path] {
        &self.remote
    }

    // --- Local ---

    /// Append a new local stroke and return its index.
    pub(crate) fn push_local(&mut self, path: Path) -> usize {
        self.local.push(path);
        self.local.len() - 1
    }

    /// Append a point to the local stroke at `index`.
    pub(crate) fn extend_local(&mut self, index: usize, point: Point) -> bool {
        match self.local.get_mut(index) {
            Some(path) => {
                path.add_point(point);
                true
            }
            None => false,
        }
    }

    /// Drop every local stroke. Remote strokes are untouched.
    pub fn clear_local(&mut self) {
        self.local.clear();
    }

    // --- Remote ---

    /// Replace the remote set with the strokes already present in a room.
    pub fn seed_remote(&mut self, paths: Vec<Path>) {
        self.remote = paths;
        self.active_remote.clear();
    }

    /// Start a new stroke for `peer`. A stroke the peer still had open is
    /// closed first; it is never overwritten.
    pub fn start_remote(&mut self, peer: &str, path: Path) {
        if self.active_remote.contains_key(peer) {
            log::debug!("Peer {} started a stroke without ending the previous one", peer);
        }
        self.remote.push(path);
        self.active_remote
            .insert(peer.to_string(), self.remote.len() - 1);
    }

    /// Append a point to `peer`'s in-progress stroke.
    pub fn extend_remote(&mut self, peer: &str, point: Point) -> SessionResult<()> {
        let path = self
            .active_remote
            .get(peer)
            .and_then(|&index| self.remote.get_mut(index))
            .ok_or_else(|| SessionError::OutOfOrderEvent {
                peer: peer.to_string(),
            })?;
        path.add_point(point);
        Ok(())
    }

    /// Close `peer`'s in-progress stroke. Returns false if none was open.
    pub fn end_remote(&mut self, peer: &str) -> bool {
        self.active_remote.remove(peer).is_some()
    }

    /// Close in-progress strokes of peers not in `present`.
    pub fn retain_active_peers<'a>(&mut self, present: impl IntoIterator<Item = &'a str>) {
        let present: Vec<&str> = present.into_iter().collect();
        self.active_remote
            .retain(|peer, _| present.contains(&peer.as_str()));
    }

    /// Whether `peer` currently has a stroke in progress.
    pub fn is_remote_active(&self, peer: &str) -> bool {
        self.active_remote.contains_key(peer)
    }

    /// Drop every remote stroke.
    pub fn clear_remote(&mut self) {
        self.remote.clear();
        self.active_remote.clear();
    }
}
