use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Row, RowKey};

/// A named contiguous range `[start, limit)` over a sort view's ordering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub name: String,
    pub start: usize,
    pub limit: usize,
    /// Lowest coverage among rows assigned so far, used to color the heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_coverage: Option<i32>,
}

impl Partition {
    pub fn new(name: impl Into<String>, start: usize, limit: usize) -> Self {
        Self {
            name: name.into(),
            start,
            limit,
            min_coverage: None,
        }
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        ordinal >= self.start && ordinal < self.limit
    }

    /// Lower the recorded minimum coverage if `coverage` is smaller
    pub fn observe_coverage(&mut self, coverage: i32) {
        self.min_coverage = Some(match self.min_coverage {
            Some(current) => current.min(coverage),
            None => coverage,
        });
    }
}

/// One ordering of the dataset's rows, split into partitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SortView {
    #[serde(default)]
    pub rows: Vec<RowKey>,
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

/// The row section of a page payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Section {
    #[serde(default)]
    pub rows: BTreeMap<RowKey, Row>,
}

/// The full server response for one page of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub loc: String,
    pub page: String,
    #[serde(default)]
    pub can_modify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(default)]
    pub display_sets: BTreeMap<String, SortView>,
}

impl Dataset {
    pub fn row_count(&self) -> Option<usize> {
        self.section.as_ref().map(|s| s.rows.len())
    }

    pub fn row(&self, key: &str) -> Option<&Row> {
        self.section.as_ref().and_then(|s| s.rows.get(key))
    }

    pub fn meta(&self) -> DatasetMeta {
        DatasetMeta {
            loc: self.loc.clone(),
            page: self.page.clone(),
            can_modify: self.can_modify,
            row_count: self.row_count(),
        }
    }
}

/// Identity of a dataset for reuse purposes, retained after the dataset itself is dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub loc: String,
    pub page: String,
    pub can_modify: bool,
    /// `None` when the dataset had no row section
    pub row_count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dataset_deserialization() {
        let dataset: Dataset = serde_json::from_value(json!({
            "loc": "de",
            "page": "Languages",
            "canModify": true,
            "section": { "rows": { "k1": { "xpstrid": "k1", "xpathId": 1 } } },
            "displaySets": {
                "ph": {
                    "rows": ["k1"],
                    "partitions": [{ "name": "A", "start": 0, "limit": 1 }]
                }
            }
        }))
        .unwrap();

        assert_eq!(dataset.row_count(), Some(1));
        assert!(dataset.row("k1").is_some());
        assert_eq!(dataset.display_sets["ph"].partitions[0].min_coverage, None);

        let meta = dataset.meta();
        assert_eq!(meta.page, "Languages");
        assert!(meta.can_modify);
    }

    #[test]
    fn test_missing_section_has_no_row_count() {
        let dataset: Dataset =
            serde_json::from_value(json!({ "loc": "de", "page": "Languages" })).unwrap();
        assert_eq!(dataset.row_count(), None);
        assert_eq!(dataset.meta().row_count, None);
    }

    #[test]
    fn test_partition_coverage_only_decreases() {
        let mut partition = Partition::new("A", 0, 3);
        partition.observe_coverage(60);
        partition.observe_coverage(80);
        assert_eq!(partition.min_coverage, Some(60));
        partition.observe_coverage(40);
        assert_eq!(partition.min_coverage, Some(40));
        assert!(partition.contains(2));
        assert!(!partition.contains(3));
    }
}
