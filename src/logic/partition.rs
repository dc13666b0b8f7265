use crate::model::Partition;

/// Find the index of the partition containing `ordinal`.
///
/// `current` is checked first since rows are normally visited in increasing
/// order; on a miss every partition is scanned. `None` means the row is shown
/// without a heading.
pub fn find_partition(
    partitions: &[Partition],
    current: Option<usize>,
    ordinal: usize,
) -> Option<usize> {
    if let Some(idx) = current {
        if partitions.get(idx).is_some_and(|p| p.contains(ordinal)) {
            return Some(idx);
        }
    }
    partitions.iter().position(|p| p.contains(ordinal))
}

/// Stateful resolver for a single pass over one sort view
#[derive(Debug, Clone)]
pub struct PartitionResolver {
    partitions: Vec<Partition>,
    current: Option<usize>,
}

impl PartitionResolver {
    /// Start a pass; any coverage recorded by a previous pass is discarded
    pub fn new(partitions: &[Partition]) -> Self {
        Self {
            partitions: partitions
                .iter()
                .map(|p| Partition {
                    min_coverage: None,
                    ..p.clone()
                })
                .collect(),
            current: None,
        }
    }

    /// Assign the row at `ordinal` to its partition and fold in its coverage
    pub fn assign(&mut self, ordinal: usize, coverage: i32) -> Option<&Partition> {
        let found = find_partition(&self.partitions, self.current, ordinal);
        if let Some(idx) = found {
            self.current = Some(idx);
            self.partitions[idx].observe_coverage(coverage);
            return self.partitions.get(idx);
        }
        None
    }

    pub fn into_partitions(self) -> Vec<Partition> {
        self.partitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sections() -> Vec<Partition> {
        vec![
            Partition::new("Africa", 0, 3),
            Partition::new("America", 3, 5),
            Partition::new("Asia", 5, 9),
        ]
    }

    fn oracle(partitions: &[Partition], ordinal: usize) -> Option<usize> {
        partitions
            .iter()
            .enumerate()
            .find(|(_, p)| ordinal >= p.start && ordinal < p.limit)
            .map(|(i, _)| i)
    }

    #[test]
    fn test_fast_path_and_scan() {
        let parts = sections();
        assert_eq!(find_partition(&parts, None, 0), Some(0));
        assert_eq!(find_partition(&parts, Some(0), 2), Some(0));
        assert_eq!(find_partition(&parts, Some(0), 3), Some(1));
        assert_eq!(find_partition(&parts, Some(2), 1), Some(0));
        assert_eq!(find_partition(&parts, Some(1), 9), None);
        assert_eq!(find_partition(&parts, Some(17), 4), Some(1));
        assert_eq!(find_partition(&[], None, 0), None);
    }

    #[test]
    fn test_min_coverage_per_pass() {
        let mut resolver = PartitionResolver::new(&sections());
        let coverages = [80, 40, 60, 100, 100, 20];
        for (ordinal, cov) in coverages.iter().enumerate() {
            resolver.assign(ordinal, *cov);
        }
        let parts = resolver.into_partitions();
        assert_eq!(parts[0].min_coverage, Some(40));
        assert_eq!(parts[1].min_coverage, Some(100));
        assert_eq!(parts[2].min_coverage, Some(20));

        // A new pass starts clean
        let resolver = PartitionResolver::new(&parts);
        assert!(resolver
            .into_partitions()
            .iter()
            .all(|p| p.min_coverage.is_none()));
    }

    #[test]
    fn test_out_of_order_falls_back_to_scan() {
        let mut resolver = PartitionResolver::new(&sections());
        assert_eq!(resolver.assign(7, 10).map(|p| p.name.as_str()), Some("Asia"));
        assert_eq!(resolver.assign(1, 10).map(|p| p.name.as_str()), Some("Africa"));
        assert_eq!(resolver.assign(4, 10).map(|p| p.name.as_str()), Some("America"));
        assert!(resolver.assign(42, 10).is_none());
    }

    proptest! {
        #[test]
        fn matches_linear_scan(
            widths in proptest::collection::vec(1usize..6, 0..8),
            offset in 0usize..3,
            extra in 0usize..4,
        ) {
            let mut parts = Vec::new();
            let mut start = offset;
            for (i, w) in widths.iter().enumerate() {
                parts.push(Partition::new(format!("p{i}"), start, start + w));
                start += w;
            }
            let mut current = None;
            for ordinal in 0..start + extra {
                let found = find_partition(&parts, current, ordinal);
                prop_assert_eq!(found, oracle(&parts, ordinal));
                if found.is_some() {
                    current = found;
                }
            }
        }
    }
}
