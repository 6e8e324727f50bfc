//! Batch composition: the i-th member of every group goes to batch i.

use crate::group::GroupIndex;

/// One output workbook's worth of record indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBatch {
    /// 1-based batch position
    pub index: usize,
    /// Arena indices, one per sufficiently long group, in group order
    pub members: Vec<usize>,
}

/// `min(group_size, largest group)`; 0 when there are no groups
#[must_use]
pub fn batch_count(group_size: usize, groups: &GroupIndex) -> usize {
    group_size.min(groups.max_group_len())
}

/// Builds batches one at a time from a [`GroupIndex`]
#[derive(Debug, Clone, Copy)]
pub struct OutputComposer {
    group_size: usize,
}

impl OutputComposer {
    #[must_use]
    pub fn new(group_size: usize) -> Self {
        Self { group_size }
    }

    /// Lazily yield batches `1..=N`.
    ///
    /// Groups shorter than the batch position are skipped, never padded.
    pub fn compose<'a>(&self, groups: &'a GroupIndex) -> impl Iterator<Item = OutputBatch> + 'a {
        let count = batch_count(self.group_size, groups);
        (1..=count).map(move |index| OutputBatch {
            index,
            members: groups
                .iter()
                .filter_map(|(_, members)| members.get(index - 1).copied())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CellValue, Record, RecordSet};
    use std::sync::Arc;

    fn index_of(ids: &[&str]) -> GroupIndex {
        let column: Arc<str> = Arc::from("BrowserID");
        let mut records = RecordSet::new();
        records.extend(
            ids.iter()
                .map(|id| Record::new(0, vec![(Arc::clone(&column), CellValue::from(*id))])),
        );
        GroupIndex::build(&records, "BrowserID").unwrap()
    }

    #[test]
    fn test_two_documents_with_overlapping_identities() {
        // doc1: A B C, doc2: A B D
        let groups = index_of(&["A", "B", "C", "A", "B", "D"]);
        let batches: Vec<_> = OutputComposer::new(5).compose(&groups).collect();

        assert_eq!(batch_count(5, &groups), 2);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].members, vec![0, 1, 2, 5]);
        assert_eq!(batches[1].index, 2);
        assert_eq!(batches[1].members, vec![3, 4]);
    }

    #[test]
    fn test_ceiling_truncates_long_groups() {
        let groups = index_of(&["A"; 5]);
        let batches: Vec<_> = OutputComposer::new(2).compose(&groups).collect();

        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.members.len() == 1));
    }

    #[test]
    fn test_no_groups_yields_no_batches() {
        let groups = GroupIndex::default();
        assert_eq!(OutputComposer::new(10).compose(&groups).count(), 0);
    }
}
