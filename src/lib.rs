pub mod config;
pub mod error;
pub mod logic;
pub mod model;
pub mod store;

pub use error::{TableError, TableResult};

// Export logic types
pub use logic::{
    derive_permissions, find_partition, row_checksum, status_class, CompatibilityChecker,
    ConsistencyValidator, DisplayVoter, OrgTallyRow, PartitionResolver, ReconcileContext,
    RowCells, RowOutcome, RowPermissions, RowReconciler, RowUpdate, Severity, TableMode,
    TableReconciler, TableUpdate, TallyBlock, TallyView, UpdateDecision, Violation,
    ViolationType, VoteMarker, VoteTallyAggregator,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{DiagnosticSink, LogSink, MemorySink, RenderStateCache, RowRenderState};

/// Initialize logging with INFO level unless RUST_LOG says otherwise.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
