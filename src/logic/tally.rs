use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::model::{
    cmp_voter_ids, is_no_winning_value, ConfirmStatus, Item, ItemClass, OrgId, OrgVoteInfo, Row,
    StatusClass, Vote, VoteResolver, VoterId,
};

/// Voter shown on an organization row; anonymous voters are masked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DisplayVoter {
    Named(VoterId),
    Anonymous,
}

/// Marker shown on a value that has no identifiable voters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteMarker {
    NoVotes,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgTallyRow {
    pub org: OrgId,
    pub voter: DisplayVoter,
    pub vote_count: i64,
    /// The organization's own aggregate choice is this value
    pub is_org_choice: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyBlock {
    pub value: String,
    pub vote_count: i64,
    pub class: ItemClass,
    /// Set when this is the winning value, carrying the row's status
    pub winning: Option<StatusClass>,
    pub is_baseline: bool,
    pub orgs: Vec<OrgTallyRow>,
    pub marker: Option<VoteMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyView {
    pub status: StatusClass,
    pub value_is_locked: bool,
    pub required_votes: Option<i64>,
    /// One block per value, in the order the resolver listed them
    pub blocks: Vec<TallyBlock>,
}

/// Row status for display, with the inherited variants applied
pub fn status_class(row: &Row) -> StatusClass {
    let inherits = row
        .winning_item()
        .is_some_and(|item| item.is_inheritance_marker());
    match (inherits, row.confirm_status) {
        (true, ConfirmStatus::Unconfirmed) => StatusClass::InheritedUnconfirmed,
        (true, ConfirmStatus::Provisional) => StatusClass::InheritedProvisional,
        (_, status) => status.into(),
    }
}

pub struct VoteTallyAggregator;

impl VoteTallyAggregator {
    /// Build the per-value vote summary for a row, or `None` if it has no resolver
    pub fn build_tally(row: &Row) -> Option<TallyView> {
        let resolver = row.vote_resolver.as_ref()?;
        let status = status_class(row);
        let winning_value = row.winning_value();
        let by_value = row.items_by_value();

        let mut blocks = Vec::new();
        for (value, vote_count) in resolver.value_votes() {
            if is_no_winning_value(value) {
                continue;
            }
            let Some(value) = value else { continue };
            let Some(item) = by_value.get(value) else {
                log::debug!(
                    "row {:?}: resolver value '{}' has no backing item",
                    row.xpstrid,
                    value
                );
                continue;
            };

            let orgs = resolver
                .orgs
                .iter()
                .filter_map(|(org, info)| Self::org_row(resolver, item, value, org, info))
                .collect();

            blocks.push(TallyBlock {
                value: value.to_string(),
                vote_count,
                class: item.class.clone(),
                winning: (winning_value == Some(value)).then_some(status),
                is_baseline: item.is_baseline_value,
                orgs,
                marker: Self::marker(item),
            });
        }

        Some(TallyView {
            status,
            value_is_locked: resolver.value_is_locked,
            required_votes: resolver.required_votes,
            blocks,
        })
    }

    fn org_row(
        resolver: &VoteResolver,
        item: &Item,
        value: &str,
        org: &OrgId,
        info: &OrgVoteInfo,
    ) -> Option<OrgTallyRow> {
        let voters: Vec<(&VoterId, &Vote)> =
            item.votes.iter().filter(|(_, v)| &v.org == org).collect();
        if voters.is_empty() {
            return None;
        }

        let is_org_choice = info.org_vote.as_deref() == Some(value);
        let org_total = info.votes.get(value).copied();

        let top = if is_org_choice {
            Self::top_voter(resolver, &voters, org_total)
        } else {
            None
        };
        let chosen = top.or_else(|| Self::representative(&voters))?;

        let (voter_id, vote) = chosen;
        let vote_count = match (is_org_choice, org_total) {
            (true, Some(total)) => total,
            _ => vote.effective_votes(),
        };

        Some(OrgTallyRow {
            org: org.clone(),
            voter: if vote.is_anonymous() {
                DisplayVoter::Anonymous
            } else {
                DisplayVoter::Named(voter_id.clone())
            },
            vote_count,
            is_org_choice,
        })
    }

    /// Voter whose own count equals the org total; latest timestamp wins,
    /// equal timestamps go to the lowest voter id
    fn top_voter<'a>(
        resolver: &VoteResolver,
        voters: &[(&'a VoterId, &'a Vote)],
        org_total: Option<i64>,
    ) -> Option<(&'a VoterId, &'a Vote)> {
        let total = org_total?;
        voters
            .iter()
            .filter(|(_, vote)| vote.effective_votes() == total)
            .sorted_by(|(a_id, a), (b_id, b)| {
                Self::vote_time(resolver, b_id, b)
                    .cmp(&Self::vote_time(resolver, a_id, a))
                    .then_with(|| cmp_voter_ids(a_id, b_id))
            })
            .next()
            .copied()
    }

    fn vote_time(resolver: &VoteResolver, voter: &str, vote: &Vote) -> Option<i64> {
        resolver.timestamp_of(voter).or(vote.timestamp)
    }

    fn representative<'a>(
        voters: &[(&'a VoterId, &'a Vote)],
    ) -> Option<(&'a VoterId, &'a Vote)> {
        voters
            .iter()
            .min_by(|(a, _), (b, _)| cmp_voter_ids(a, b))
            .copied()
    }

    fn marker(item: &Item) -> Option<VoteMarker> {
        match item.votes.len() {
            0 => Some(VoteMarker::NoVotes),
            1 if item.votes.values().all(Vote::is_anonymous) => Some(VoteMarker::Anonymous),
            _ => None,
        }
    }
}
