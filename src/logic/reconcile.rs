use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{TableError, TableResult};
use crate::logic::cells::{derive_permissions, RowCells, RowPermissions};
use crate::logic::checksum::{is_unchanged, row_checksum};
use crate::logic::compat::CompatibilityChecker;
use crate::logic::consistency::{ConsistencyValidator, Violation};
use crate::logic::partition::PartitionResolver;
use crate::logic::tally::{TallyView, VoteTallyAggregator};
use crate::model::{Dataset, DatasetMeta, Partition, Row, RowKey, SortView, TextDirection};
use crate::store::render_state_cache::{RenderInputs, RenderStateCache, RowRenderState};
use crate::store::traits::{DiagnosticSink, LogSink};

/// Per-call settings for a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileContext {
    pub debug: bool,
    /// When false every non-pending row is refreshed regardless of its checksum
    pub checksum_skip: bool,
    pub text_direction: TextDirection,
    /// Sort view to follow; the first one by name when unset
    pub sort_view: Option<String>,
}

impl Default for ReconcileContext {
    fn default() -> Self {
        Self {
            debug: false,
            checksum_skip: true,
            text_direction: TextDirection::Ltr,
            sort_view: None,
        }
    }
}

/// Everything the rendering layer needs to redraw one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowUpdate {
    pub row_id: String,
    pub permissions: RowPermissions,
    pub cells: RowCells,
    pub tally: Option<TallyView>,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum UpdateDecision {
    /// Checksum unchanged since the last render
    Skip,
    Refresh(Box<RowUpdate>),
    /// Row has a vote submission in flight; the update is dropped
    Deferred,
    /// Row could not be processed and renders as an error placeholder
    Placeholder { reason: String },
}

impl UpdateDecision {
    pub fn is_refresh(&self) -> bool {
        matches!(self, UpdateDecision::Refresh(_))
    }

    pub fn update(&self) -> Option<&RowUpdate> {
        match self {
            UpdateDecision::Refresh(update) => Some(&**update),
            _ => None,
        }
    }
}

/// Decides per row whether the last render can stand, and rebuilds it if not
#[derive(Debug)]
pub struct RowReconciler<D: DiagnosticSink = LogSink> {
    states: RenderStateCache,
    sink: D,
}

impl RowReconciler<LogSink> {
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }
}

impl Default for RowReconciler<LogSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DiagnosticSink> RowReconciler<D> {
    pub fn with_sink(sink: D) -> Self {
        Self {
            states: RenderStateCache::new(),
            sink,
        }
    }

    /// Decide what to do with `row` given what was last rendered for its key.
    ///
    /// A row is skipped only when both its checksum and the render inputs
    /// (`dataset_can_modify`, `ctx.text_direction`) match the last refresh.
    pub fn reconcile(
        &mut self,
        ctx: &ReconcileContext,
        row: &Row,
        dataset_can_modify: bool,
    ) -> UpdateDecision {
        let key = match row.require_ids() {
            Ok(key) => key,
            Err(e) => return Self::placeholder(e),
        };

        if self.states.is_pending(key) {
            Self::trace(ctx, key, "deferred, vote in flight");
            return UpdateDecision::Deferred;
        }

        let checksum = match row_checksum(row) {
            Ok(checksum) => checksum,
            Err(e) => return Self::placeholder(e),
        };
        let inputs = RenderInputs {
            can_modify: dataset_can_modify,
            direction: ctx.text_direction,
        };
        let previous = self
            .states
            .get(key)
            .filter(|s| s.inputs == Some(inputs))
            .and_then(|s| s.checksum);
        if ctx.checksum_skip && is_unchanged(previous, checksum) {
            Self::trace(ctx, key, "skip, checksum unchanged");
            return UpdateDecision::Skip;
        }

        let violations = ConsistencyValidator::validate_and_report(row, &self.sink);
        let permissions = derive_permissions(row, dataset_can_modify);
        let cells = RowCells::compute(row, &permissions, ctx.text_direction);
        let tally = VoteTallyAggregator::build_tally(row);

        let state = self
            .states
            .record_refresh(key, checksum, inputs, permissions, cells.clone());
        Self::trace(ctx, key, "refresh");

        UpdateDecision::Refresh(Box::new(RowUpdate {
            row_id: state.row_id.clone(),
            permissions,
            cells,
            tally,
            violations,
        }))
    }

    pub fn state(&self, key: &str) -> Option<&RowRenderState> {
        self.states.get(key)
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    fn placeholder(error: TableError) -> UpdateDecision {
        log::warn!("rendering error placeholder: {}", error);
        UpdateDecision::Placeholder {
            reason: error.to_string(),
        }
    }

    fn trace(ctx: &ReconcileContext, key: &str, what: &str) {
        if ctx.debug {
            log::info!("row {}: {}", key, what);
        } else {
            log::debug!("row {}: {}", key, what);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableMode {
    /// Existing table kept; rows diffed individually
    Reuse,
    /// Table recreated from scratch
    Rebuild,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub key: RowKey,
    pub ordinal: usize,
    /// Name of the containing partition, if any
    pub partition: Option<String>,
    pub decision: UpdateDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableUpdate {
    pub mode: TableMode,
    pub sort_view: Option<String>,
    /// Rows in sort-view order
    pub rows: Vec<RowOutcome>,
    /// Partitions of the sort view with their minimum coverage
    pub headings: Vec<Partition>,
    /// Keys whose render state was discarded
    pub removed: Vec<RowKey>,
}

/// Reconciles whole datasets and single-row patches against the rendered table
#[derive(Debug)]
pub struct TableReconciler<D: DiagnosticSink = LogSink> {
    rows: RowReconciler<D>,
    last_meta: Option<DatasetMeta>,
}

impl TableReconciler<LogSink> {
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }
}

impl Default for TableReconciler<LogSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DiagnosticSink> TableReconciler<D> {
    pub fn with_sink(sink: D) -> Self {
        Self {
            rows: RowReconciler::with_sink(sink),
            last_meta: None,
        }
    }

    pub fn apply_dataset(
        &mut self,
        ctx: &ReconcileContext,
        dataset: &Dataset,
    ) -> TableResult<TableUpdate> {
        let (view_name, view) = Self::select_view(ctx, dataset)?;

        let meta = dataset.meta();
        let mode = match &self.last_meta {
            Some(old) if CompatibilityChecker::is_compatible_meta(old, &meta) => TableMode::Reuse,
            _ => TableMode::Rebuild,
        };

        let keep: HashSet<&str> = dataset
            .section
            .as_ref()
            .map(|s| s.rows.keys().map(String::as_str).collect())
            .unwrap_or_default();
        let removed = match mode {
            TableMode::Reuse => self.rows.states.retain_keys(&keep),
            TableMode::Rebuild => self.rows.states.reset(&keep),
        };

        log::info!(
            "applying dataset {}/{} ({:?}, {} rows, view {:?})",
            dataset.loc,
            dataset.page,
            mode,
            meta.row_count.unwrap_or(0),
            view_name
        );

        let order: Vec<RowKey> = match &view {
            Some(view) => view.rows.clone(),
            None => dataset
                .section
                .as_ref()
                .map(|s| s.rows.keys().cloned().collect())
                .unwrap_or_default(),
        };
        let mut resolver = PartitionResolver::new(
            view.as_ref().map(|v| v.partitions.as_slice()).unwrap_or(&[]),
        );

        let mut rows = Vec::with_capacity(order.len());
        for (ordinal, key) in order.into_iter().enumerate() {
            let Some(row) = dataset.row(&key) else {
                log::warn!("sort view lists row {} missing from section", key);
                continue;
            };
            let partition = resolver
                .assign(ordinal, row.coverage_value)
                .map(|p| p.name.clone());
            let decision = self.rows.reconcile(ctx, row, dataset.can_modify);
            rows.push(RowOutcome {
                key,
                ordinal,
                partition,
                decision,
            });
        }

        self.last_meta = Some(meta);

        Ok(TableUpdate {
            mode,
            sort_view: view_name,
            rows,
            headings: resolver.into_partitions(),
            removed,
        })
    }

    /// A single-row vote submission has been sent for `key`
    pub fn mark_pending(&mut self, key: &str) {
        self.rows.states.mark_pending(key);
    }

    /// Abandon an in-flight submission without a response
    pub fn clear_pending(&mut self, key: &str) {
        self.rows.states.clear_pending(key);
    }

    /// Handle the single-row response: leave the pending state and reconcile the row.
    ///
    /// Permissions use the `canModify` flag of the last applied dataset; before
    /// any dataset has been applied the row is treated as read-only.
    pub fn apply_single_row(&mut self, ctx: &ReconcileContext, row: &Row) -> UpdateDecision {
        if let Ok(key) = row.require_ids() {
            self.rows.states.clear_pending(key);
        }
        let can_modify = self.last_meta.as_ref().is_some_and(|m| m.can_modify);
        self.rows.reconcile(ctx, row, can_modify)
    }

    pub fn rows(&self) -> &RowReconciler<D> {
        &self.rows
    }

    pub fn last_meta(&self) -> Option<&DatasetMeta> {
        self.last_meta.as_ref()
    }

    fn select_view(
        ctx: &ReconcileContext,
        dataset: &Dataset,
    ) -> TableResult<(Option<String>, Option<SortView>)> {
        match &ctx.sort_view {
            Some(name) => dataset
                .display_sets
                .get(name)
                .map(|view| (Some(name.clone()), Some(view.clone())))
                .ok_or_else(|| TableError::UnknownSortView(name.clone())),
            None => Ok(dataset
                .display_sets
                .iter()
                .next()
                .map(|(name, view)| (Some(name.clone()), Some(view.clone())))
                .unwrap_or((None, None))),
        }
    }
}
