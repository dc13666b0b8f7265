use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Stable hex key of a row (`xpstrid`)
pub type RowKey = String;
/// Hash identifying one candidate item within a row
pub type ValueHash = String;
pub type VoterId = String;
pub type OrgId = String;

/// Reserved value meaning "use the value inherited from the parent locale"
pub const INHERITANCE_MARKER: &str = "↑↑↑";

/// Wire sentinel equivalent to an absent winning value
pub const NO_WINNING_VALUE: &str = "no-winning-value";

/// Vote level whose voter identity is withheld from display
pub const ANONYMOUS_LEVEL: &str = "anonymous";

pub fn is_inheritance_marker(value: &str) -> bool {
    value == INHERITANCE_MARKER
}

/// True for values that count as "no valid winning value"
pub fn is_no_winning_value(value: Option<&str>) -> bool {
    matches!(value, None | Some(NO_WINNING_VALUE))
}

pub fn generate_row_id() -> String {
    format!("r-{}", Uuid::new_v4())
}

/// Orders voter ids numerically when both parse, lexically otherwise
pub fn cmp_voter_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Approval status as delivered by the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmStatus {
    Approved,
    Contributed,
    Provisional,
    Unconfirmed,
    #[default]
    Missing,
}

/// Status classification used for display.
///
/// The inherited variants never come from the data source; they are derived
/// when the winning value is the inheritance marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Approved,
    Contributed,
    Provisional,
    Unconfirmed,
    Missing,
    InheritedProvisional,
    InheritedUnconfirmed,
}

impl From<ConfirmStatus> for StatusClass {
    fn from(status: ConfirmStatus) -> Self {
        match status {
            ConfirmStatus::Approved => StatusClass::Approved,
            ConfirmStatus::Contributed => StatusClass::Contributed,
            ConfirmStatus::Provisional => StatusClass::Provisional,
            ConfirmStatus::Unconfirmed => StatusClass::Unconfirmed,
            ConfirmStatus::Missing => StatusClass::Missing,
        }
    }
}

/// Display classification of a candidate item (`pClass` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    Winner,
    Alias,
    #[default]
    Value,
    FallbackRoot,
    FallbackCode,
    Fallback,
    Loser,
    #[serde(other)]
    Other,
}

/// Permission decision precomputed by the data source for the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusAction {
    Allow,
    AllowVotingAndTicket,
    AllowVotingButNoAdd,
    AllowTicketOnly,
    ForbidErrors,
    #[default]
    ForbidReadonly,
    ForbidUnlessDataSubmission,
    ForbidNull,
    ForbidRoot,
    ForbidCode,
    ForbidPermanentWithoutForum,
}

impl StatusAction {
    pub fn may_vote(self) -> bool {
        matches!(
            self,
            StatusAction::Allow
                | StatusAction::AllowVotingAndTicket
                | StatusAction::AllowVotingButNoAdd
        )
    }

    /// May propose new values or change existing ones
    pub fn may_change(self) -> bool {
        matches!(self, StatusAction::Allow | StatusAction::AllowVotingAndTicket)
    }

    pub fn is_ticket_only(self) -> bool {
        self == StatusAction::AllowTicketOnly
    }
}

/// Text direction of the locale being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_winning_value_equivalence() {
        assert!(is_no_winning_value(None));
        assert!(is_no_winning_value(Some(NO_WINNING_VALUE)));
        assert!(!is_no_winning_value(Some("foo")));
        assert!(!is_no_winning_value(Some("")));
    }

    #[test]
    fn test_voter_id_ordering() {
        assert_eq!(cmp_voter_ids("9", "10"), Ordering::Less);
        assert_eq!(cmp_voter_ids("abc", "abd"), Ordering::Less);
        assert_eq!(cmp_voter_ids("7", "7"), Ordering::Equal);
    }

    #[test]
    fn test_status_action_wire_format() {
        let action: StatusAction = serde_json::from_str("\"ALLOW_TICKET_ONLY\"").unwrap();
        assert_eq!(action, StatusAction::AllowTicketOnly);
        assert!(action.is_ticket_only());
        assert!(!action.may_vote());

        let action: StatusAction = serde_json::from_str("\"ALLOW_VOTING_BUT_NO_ADD\"").unwrap();
        assert!(action.may_vote());
        assert!(!action.may_change());

        let action: StatusAction = serde_json::from_str("\"FORBID_READONLY\"").unwrap();
        assert!(!action.may_vote() && !action.may_change());
    }

    #[test]
    fn test_unknown_item_class_is_tolerated() {
        let class: ItemClass = serde_json::from_str("\"constructed\"").unwrap();
        assert_eq!(class, ItemClass::Other);
        let class: ItemClass = serde_json::from_str("\"fallback_root\"").unwrap();
        assert_eq!(class, ItemClass::FallbackRoot);
    }
}
