//! Partition of the record arena by identity.

use std::collections::BTreeMap;

use tracing::debug;

use sheetsplit_utils::error::SheetSplitError;

use crate::record::{IdentityKey, RecordSet, normalize_identity};

/// Groups of record indices keyed by normalized identity.
///
/// Groups iterate in identity order; members keep arena order, which is
/// discovery order then row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    groups: BTreeMap<IdentityKey, Vec<usize>>,
    rows_without_identity: usize,
}

impl GroupIndex {
    /// Group `records` by the values of `identity_column`.
    ///
    /// Records whose identity is blank are counted and left out. Fails with
    /// `NoIdentityColumn` when records exist but none carries the column.
    pub fn build(records: &RecordSet, identity_column: &str) -> Result<Self, SheetSplitError> {
        if !records.is_empty() && !records.has_column(identity_column) {
            return Err(SheetSplitError::NoIdentityColumn {
                column: identity_column.to_string(),
            });
        }

        let mut groups: BTreeMap<IdentityKey, Vec<usize>> = BTreeMap::new();
        let mut rows_without_identity = 0;

        for (index, record) in records.iter().enumerate() {
            match record.get(identity_column).and_then(normalize_identity) {
                Some(identity) => groups
                    .entry(IdentityKey::from_normalized(identity))
                    .or_default()
                    .push(index),
                None => rows_without_identity += 1,
            }
        }

        for (key, members) in &groups {
            debug!(identity = %key, size = members.len(), "group");
        }

        Ok(Self {
            groups,
            rows_without_identity,
        })
    }

    /// Number of distinct identities
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Length of the largest group, 0 when there are none
    #[must_use]
    pub fn max_group_len(&self) -> usize {
        self.groups.values().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn rows_without_identity(&self) -> usize {
        self.rows_without_identity
    }

    #[must_use]
    pub fn members(&self, identity: &str) -> Option<&[usize]> {
        self.groups
            .get(&IdentityKey::from_normalized(identity.to_string()))
            .map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, &[usize])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }
}
