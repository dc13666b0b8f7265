use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::logic::cells::{RowCells, RowPermissions};
use crate::model::{generate_row_id, RowKey, TextDirection};

/// Inputs besides the row itself that shape the rendered cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderInputs {
    pub can_modify: bool,
    pub direction: TextDirection,
}

/// What was last rendered for one row
#[derive(Clone, Debug)]
pub struct RowRenderState {
    /// Stable identifier assigned the first time the row is seen
    pub row_id: String,
    /// Checksum of the last refreshed row; `None` until the first refresh
    pub checksum: Option<i32>,
    /// Inputs the last refresh was computed with
    pub inputs: Option<RenderInputs>,
    pub permissions: RowPermissions,
    pub cells: Option<RowCells>,
    /// A single-row vote submission is in flight
    pub pending: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl RowRenderState {
    fn new() -> Self {
        Self {
            row_id: generate_row_id(),
            checksum: None,
            inputs: None,
            permissions: RowPermissions::default(),
            cells: None,
            pending: false,
            refreshed_at: None,
        }
    }
}

/// Per-row render state keyed by row key.
///
/// Entries are created on first reconciliation of a key, updated on every
/// refresh, and discarded when the key leaves the row set.
#[derive(Debug, Default)]
pub struct RenderStateCache {
    entries: HashMap<RowKey, RowRenderState>,
}

impl RenderStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&RowRenderState> {
        self.entries.get(key)
    }

    /// Get the state for a key, creating a fresh record if absent
    pub fn entry(&mut self, key: &str) -> &mut RowRenderState {
        self.entries
            .entry(key.to_string())
            .or_insert_with(RowRenderState::new)
    }

    pub fn record_refresh(
        &mut self,
        key: &str,
        checksum: i32,
        inputs: RenderInputs,
        permissions: RowPermissions,
        cells: RowCells,
    ) -> &RowRenderState {
        let state = self.entry(key);
        state.checksum = Some(checksum);
        state.inputs = Some(inputs);
        state.permissions = permissions;
        state.cells = Some(cells);
        state.refreshed_at = Some(Utc::now());
        state
    }

    pub fn mark_pending(&mut self, key: &str) {
        self.entry(key).pending = true;
    }

    pub fn clear_pending(&mut self, key: &str) {
        if let Some(state) = self.entries.get_mut(key) {
            state.pending = false;
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|s| s.pending)
    }

    /// Drop state for every key not in `keep`, returning the removed keys sorted
    pub fn retain_keys(&mut self, keep: &HashSet<&str>) -> Vec<RowKey> {
        let mut removed: Vec<RowKey> = self
            .entries
            .keys()
            .filter(|k| !keep.contains(k.as_str()))
            .cloned()
            .collect();
        removed.sort();
        for key in &removed {
            self.entries.remove(key);
        }
        removed
    }

    /// Discard all render state for a rebuilt table, returning the previous keys sorted.
    ///
    /// Pending flags survive for keys in `keep`; those rows get a fresh record
    /// that is still pending, so bulk data cannot overwrite an in-flight vote.
    pub fn reset(&mut self, keep: &HashSet<&str>) -> Vec<RowKey> {
        let mut removed: Vec<RowKey> = self.entries.keys().cloned().collect();
        removed.sort();
        self.entries
            .retain(|key, state| state.pending && keep.contains(key.as_str()));
        for state in self.entries.values_mut() {
            *state = RowRenderState {
                pending: true,
                ..RowRenderState::new()
            };
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
