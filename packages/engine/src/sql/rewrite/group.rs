use std::collections::BTreeMap;

use crate::sql::rewrite::statement::RewriteResult;
use crate::GraphloadError;

/// Rewritten statements bucketed by group key, in input order per bucket.
#[derive(Debug, Default)]
pub(crate) struct GroupSet {
    groups: BTreeMap<String, Vec<RewriteResult>>,
}

impl GroupSet {
    pub(crate) fn insert(&mut self, result: RewriteResult) -> Result<(), GraphloadError> {
        let members = self.groups.entry(result.group_key.clone()).or_default();
        if let Some(first) = members.first() {
            if first.identity_columns != result.identity_columns {
                return Err(GraphloadError::IdentityColumnMismatch {
                    group_key: result.group_key,
                    expected: first.identity_columns.clone(),
                    found: result.identity_columns,
                });
            }
        }
        members.push(result);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn into_groups(self) -> impl Iterator<Item = (String, Vec<RewriteResult>)> {
        self.groups.into_iter()
    }
}
