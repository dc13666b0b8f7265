use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{TableError, TableResult};
use crate::model::{
    is_no_winning_value, ConfirmStatus, ItemClass, RowKey, StatusAction, ValueHash, Vote,
    VoteResolver, VoterId, INHERITANCE_MARKER,
};

/// One candidate value for a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "pClass", default)]
    pub class: ItemClass,
    #[serde(default)]
    pub is_baseline_value: bool,
    #[serde(default)]
    pub votes: BTreeMap<VoterId, Vote>,
}

impl Item {
    pub fn is_inheritance_marker(&self) -> bool {
        self.value.as_deref() == Some(INHERITANCE_MARKER)
    }
}

/// One contested data value with its candidate items and votes.
///
/// The id fields are optional on the wire so that a malformed row can be
/// detected and turned into an error placeholder instead of failing the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpstrid: Option<RowKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath_id: Option<i64>,
    #[serde(default)]
    pub xpath: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub coverage_value: i32,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_example: Option<String>,
    #[serde(default)]
    pub has_voted: bool,
    #[serde(default)]
    pub row_flagged: bool,
    #[serde(default)]
    pub can_flag_on_losing: bool,
    #[serde(default)]
    pub confirm_status: ConfirmStatus,
    #[serde(default)]
    pub items: BTreeMap<ValueHash, Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_vhash: Option<ValueHash>,
    /// Item the current user voted for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_vhash: Option<ValueHash>,
    #[serde(
        rename = "votingResults",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vote_resolver: Option<VoteResolver>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherited_xpid: Option<String>,
    #[serde(default)]
    pub status_action: StatusAction,
}

impl Row {
    /// Returns the row key, or a malformed-row error if either id is missing
    pub fn require_ids(&self) -> TableResult<&RowKey> {
        let key = self
            .xpstrid
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or(TableError::MalformedRow { field: "xpstrid" })?;
        if self.xpath_id.is_none() {
            return Err(TableError::MalformedRow { field: "xpathId" });
        }
        Ok(key)
    }

    pub fn winning_item(&self) -> Option<&Item> {
        self.winning_vhash.as_ref().and_then(|h| self.items.get(h))
    }

    /// Winning value, with the no-winning sentinel treated as absent
    pub fn winning_value(&self) -> Option<&str> {
        let value = self.winning_item().and_then(|item| item.value.as_deref());
        if is_no_winning_value(value) {
            None
        } else {
            value
        }
    }

    pub fn user_vote_item(&self) -> Option<&Item> {
        self.vote_vhash.as_ref().and_then(|h| self.items.get(h))
    }

    /// Reverse index from raw value to item, excluding items without a value
    pub fn items_by_value(&self) -> HashMap<&str, &Item> {
        self.items
            .values()
            .filter_map(|item| match item.value.as_deref() {
                Some(v) if !v.is_empty() => Some((v, item)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> Row {
        serde_json::from_value(json!({
            "xpstrid": "1a2b3c",
            "xpathId": 42,
            "xpath": "//ldml/localeDisplayNames/languages/language[@type=\"de\"]",
            "confirmStatus": "provisional",
            "winningVhash": "h1",
            "items": {
                "h1": { "value": "Deutsch", "pClass": "winner", "votes": {} },
                "h2": { "value": "", "pClass": "value", "votes": {} },
                "h3": { "value": "Allemand", "pClass": "loser", "isBaselineValue": true, "votes": {} }
            },
            "statusAction": "ALLOW"
        }))
        .unwrap()
    }

    #[test]
    fn test_row_deserialization() {
        let row = sample_row();
        assert_eq!(row.require_ids().unwrap(), "1a2b3c");
        assert_eq!(row.confirm_status, ConfirmStatus::Provisional);
        assert_eq!(row.winning_value(), Some("Deutsch"));
        assert_eq!(row.status_action, StatusAction::Allow);
        assert!(row.items["h3"].is_baseline_value);
    }

    #[test]
    fn test_items_by_value_skips_empty() {
        let row = sample_row();
        let index = row.items_by_value();
        assert_eq!(index.len(), 2);
        assert!(index.contains_key("Deutsch"));
        assert!(!index.contains_key(""));
    }

    #[test]
    fn test_require_ids() {
        let mut row = sample_row();
        row.xpath_id = None;
        assert!(matches!(
            row.require_ids(),
            Err(TableError::MalformedRow { field: "xpathId" })
        ));

        row.xpstrid = None;
        assert!(matches!(
            row.require_ids(),
            Err(TableError::MalformedRow { field: "xpstrid" })
        ));
    }

    #[test]
    fn test_sentinel_winning_value_is_absent() {
        let mut row = sample_row();
        row.items.get_mut("h1").unwrap().value = Some("no-winning-value".to_string());
        assert_eq!(row.winning_value(), None);
    }
}
