//! Per-cell display data for a row.
//!
//! Each cell group is recomputed independently from the row alone, so the
//! rendering layer can update only the cells it needs.

use serde::{Deserialize, Serialize};

use crate::logic::tally::status_class;
use crate::model::{is_no_winning_value, Item, ItemClass, Row, StatusClass, TextDirection, ValueHash};

/// Permission fields derived from the row's status action and the dataset flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RowPermissions {
    pub can_modify: bool,
    pub ticket_only: bool,
    pub can_change: bool,
    pub can_flag: bool,
}

pub fn derive_permissions(row: &Row, dataset_can_modify: bool) -> RowPermissions {
    let action = row.status_action;
    let can_modify = dataset_can_modify && action.may_vote();
    let user_is_winning = row.vote_vhash.is_some() && row.vote_vhash == row.winning_vhash;
    RowPermissions {
        can_modify,
        ticket_only: action.is_ticket_only(),
        can_change: can_modify && action.may_change(),
        can_flag: can_modify && (user_is_winning || row.can_flag_on_losing),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCell {
    pub status: StatusClass,
    pub flagged: bool,
    pub can_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstainCell {
    /// The abstain control is offered at all
    pub selectable: bool,
    pub abstained: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    pub code: String,
    pub xpath_id: Option<i64>,
    pub direction: TextDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonCell {
    pub display_name: String,
    pub display_example: Option<String>,
}

/// One candidate value as it appears in the proposed or others column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCell {
    pub vhash: ValueHash,
    /// Raw value, possibly the inheritance marker
    pub value: Option<String>,
    /// What to show; the inherited value when the raw value is the marker
    pub display: Option<String>,
    pub inherited: bool,
    pub class: ItemClass,
    pub is_baseline: bool,
    pub is_user_vote: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedCell {
    pub status: StatusClass,
    /// `None` when the row has no valid winning value
    pub winning: Option<ValueCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OthersCell {
    pub values: Vec<ValueCell>,
    pub can_add: bool,
}

/// Every cell group of a row, as last computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowCells {
    pub status: StatusCell,
    pub abstain: AbstainCell,
    pub code: CodeCell,
    pub comparison: ComparisonCell,
    pub proposed: ProposedCell,
    pub others: OthersCell,
}

impl RowCells {
    pub fn compute(row: &Row, permissions: &RowPermissions, direction: TextDirection) -> Self {
        Self {
            status: status_cell(row, permissions),
            abstain: abstain_cell(row, permissions),
            code: code_cell(row, direction),
            comparison: comparison_cell(row),
            proposed: proposed_cell(row),
            others: others_cell(row, permissions),
        }
    }
}

pub fn status_cell(row: &Row, permissions: &RowPermissions) -> StatusCell {
    StatusCell {
        status: status_class(row),
        flagged: row.row_flagged,
        can_flag: permissions.can_flag,
    }
}

pub fn abstain_cell(row: &Row, permissions: &RowPermissions) -> AbstainCell {
    AbstainCell {
        selectable: permissions.can_modify,
        abstained: row.vote_vhash.is_none(),
    }
}

pub fn code_cell(row: &Row, direction: TextDirection) -> CodeCell {
    CodeCell {
        code: row.code.clone(),
        xpath_id: row.xpath_id,
        direction,
    }
}

pub fn comparison_cell(row: &Row) -> ComparisonCell {
    ComparisonCell {
        display_name: row.display_name.clone(),
        display_example: row.display_example.clone(),
    }
}

pub fn proposed_cell(row: &Row) -> ProposedCell {
    let winning = match (&row.winning_vhash, row.winning_item()) {
        (Some(hash), Some(item)) if !is_no_winning_value(item.value.as_deref()) => {
            Some(value_cell(row, hash, item))
        }
        _ => None,
    };
    ProposedCell {
        status: status_class(row),
        winning,
    }
}

pub fn others_cell(row: &Row, permissions: &RowPermissions) -> OthersCell {
    let values = row
        .items
        .iter()
        .filter(|(hash, _)| row.winning_vhash.as_ref() != Some(*hash))
        .filter(|(_, item)| !is_no_winning_value(item.value.as_deref()))
        .map(|(hash, item)| value_cell(row, hash, item))
        .collect();
    OthersCell {
        values,
        can_add: permissions.can_change,
    }
}

fn value_cell(row: &Row, hash: &ValueHash, item: &Item) -> ValueCell {
    let inherited = item.is_inheritance_marker();
    ValueCell {
        vhash: hash.clone(),
        value: item.value.clone(),
        display: if inherited {
            row.inherited_value.clone()
        } else {
            item.value.clone()
        },
        inherited,
        class: item.class.clone(),
        is_baseline: item.is_baseline_value,
        is_user_vote: row.vote_vhash.as_ref() == Some(hash),
    }
}
