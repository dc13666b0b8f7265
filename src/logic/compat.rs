use crate::model::{Dataset, DatasetMeta};

/// Decides whether an already rendered table can be reused for a new dataset.
///
/// Compatibility only licenses structural reuse (same number of visual rows);
/// each row is still diffed on its own.
pub struct CompatibilityChecker;

impl CompatibilityChecker {
    pub fn is_compatible(old: &Dataset, new: &Dataset) -> bool {
        Self::is_compatible_meta(&old.meta(), &new.meta())
    }

    /// Same check against the retained identity of the previously rendered dataset
    pub fn is_compatible_meta(old: &DatasetMeta, new: &DatasetMeta) -> bool {
        match (old.row_count, new.row_count) {
            (Some(old_rows), Some(new_rows)) => {
                old.page == new.page
                    && old.loc == new.loc
                    && old.can_modify == new.can_modify
                    && old_rows == new_rows
            }
            _ => false,
        }
    }
}
