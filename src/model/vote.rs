use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::{OrgId, VoterId, ANONYMOUS_LEVEL};

/// A single user's vote for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub org: OrgId,
    /// Permission level of the voter, e.g. "vetter" or "anonymous"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default)]
    pub votes: i64,
    #[serde(
        rename = "overridedVotes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub override_votes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Vote {
    /// Weight actually counted for this vote, honouring an override
    pub fn effective_votes(&self) -> i64 {
        self.override_votes.unwrap_or(self.votes)
    }

    pub fn is_anonymous(&self) -> bool {
        self.level.as_deref() == Some(ANONYMOUS_LEVEL)
    }
}

/// One organization's position within a row's vote resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrgVoteInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// The organization's own aggregate choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_vote: Option<String>,
    /// Vote totals per value cast by members of this organization
    #[serde(default)]
    pub votes: BTreeMap<String, i64>,
}

/// Per-row vote resolution summary computed by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VoteResolver {
    /// Flat alternating sequence of value and total vote count
    #[serde(rename = "value_vote", default)]
    pub value_vote: Vec<Value>,
    #[serde(default)]
    pub value_is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_votes: Option<i64>,
    #[serde(default)]
    pub orgs: BTreeMap<OrgId, OrgVoteInfo>,
    /// Last vote time per voter
    #[serde(default)]
    pub name_time: BTreeMap<VoterId, i64>,
}

impl VoteResolver {
    /// Decode the flat value/count sequence into pairs, in stored order.
    ///
    /// Values that are not strings decode as `None`; a dangling trailing value
    /// without a count is dropped.
    pub fn value_votes(&self) -> Vec<(Option<&str>, i64)> {
        self.value_vote
            .chunks_exact(2)
            .map(|pair| {
                let value = pair[0].as_str();
                let count = match &pair[1] {
                    Value::Number(n) => n
                        .as_i64()
                        .or_else(|| n.as_f64().map(|f| f as i64))
                        .unwrap_or(0),
                    Value::String(s) => s.parse().unwrap_or(0),
                    _ => 0,
                };
                (value, count)
            })
            .collect()
    }

    pub fn timestamp_of(&self, voter: &str) -> Option<i64> {
        self.name_time.get(voter).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_votes_decoding() {
        let resolver: VoteResolver = serde_json::from_value(json!({
            "value_vote": ["foo", 5, null, 2, "bar", "3", "dangling"],
            "valueIsLocked": true,
            "requiredVotes": 8
        }))
        .unwrap();

        let pairs = resolver.value_votes();
        assert_eq!(pairs, vec![(Some("foo"), 5), (None, 2), (Some("bar"), 3)]);
        assert!(resolver.value_is_locked);
        assert_eq!(resolver.required_votes, Some(8));
    }

    #[test]
    fn test_effective_votes_prefers_override() {
        let vote: Vote = serde_json::from_value(json!({
            "org": "X", "votes": 4, "overridedVotes": 1, "level": "anonymous"
        }))
        .unwrap();
        assert_eq!(vote.effective_votes(), 1);
        assert!(vote.is_anonymous());
    }
}
