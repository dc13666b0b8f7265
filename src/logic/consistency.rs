use serde::{Deserialize, Serialize};

use crate::model::Row;
use crate::store::traits::DiagnosticSink;

/// Paths allowed to carry the inheritance marker without an inherited value
pub const NULL_INHERITANCE_PATHS: &[&str] = &[
    "timeZoneNames/metazone",
    "timeZoneNames/zone",
    "dayPeriods/dayPeriodContext",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    MissingWinningHash,
    MissingItems,
    DanglingWinningHash,
    InheritanceWithoutTarget,
    InheritanceMissingProvenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Info,
}

/// An informational finding about an incoming row; never blocks rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub row_key: Option<String>,
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub message: String,
}

impl Violation {
    fn error(row: &Row, violation_type: ViolationType, message: String) -> Self {
        Self {
            row_key: row.xpstrid.clone(),
            violation_type,
            severity: Severity::Error,
            message,
        }
    }
}

pub struct ConsistencyValidator;

impl ConsistencyValidator {
    /// Check a row's invariants, in order, without failing
    pub fn validate(row: &Row) -> Vec<Violation> {
        let mut violations = Vec::new();

        match &row.winning_vhash {
            None => violations.push(Violation::error(
                row,
                ViolationType::MissingWinningHash,
                "row has no winningVhash".to_string(),
            )),
            Some(_) if row.items.is_empty() => {}
            Some(hash) if !row.items.contains_key(hash) => violations.push(Violation::error(
                row,
                ViolationType::DanglingWinningHash,
                format!("winningVhash '{}' has no matching item", hash),
            )),
            Some(_) => {}
        }

        if row.items.is_empty() {
            violations.push(Violation::error(
                row,
                ViolationType::MissingItems,
                "row has no items".to_string(),
            ));
        }

        for (hash, item) in &row.items {
            if !item.is_inheritance_marker() {
                continue;
            }
            if row.inherited_value.is_none() {
                if !Self::allows_null_inheritance(&row.xpath) {
                    violations.push(Violation::error(
                        row,
                        ViolationType::InheritanceWithoutTarget,
                        format!(
                            "item '{}' inherits but row has no inheritedValue (path {})",
                            hash, row.xpath
                        ),
                    ));
                }
            } else if row.inherited_locale.is_none() && row.inherited_xpid.is_none() {
                violations.push(Violation {
                    row_key: row.xpstrid.clone(),
                    violation_type: ViolationType::InheritanceMissingProvenance,
                    severity: Severity::Info,
                    message: format!(
                        "item '{}' inherits a value with neither inheritedLocale nor inheritedXpid",
                        hash
                    ),
                });
            }
        }

        violations
    }

    /// Validate and forward every finding to the diagnostic sink
    pub fn validate_and_report<D: DiagnosticSink + ?Sized>(
        row: &Row,
        sink: &D,
    ) -> Vec<Violation> {
        let violations = Self::validate(row);
        for violation in &violations {
            sink.report(violation);
        }
        violations
    }

    fn allows_null_inheritance(xpath: &str) -> bool {
        NULL_INHERITANCE_PATHS
            .iter()
            .any(|fragment| xpath.contains(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::traits::MemorySink;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        serde_json::from_value(value).unwrap()
    }

    fn types(violations: &[Violation]) -> Vec<ViolationType> {
        violations.iter().map(|v| v.violation_type).collect()
    }

    #[test]
    fn test_valid_row_has_no_violations() {
        let r = row(json!({
            "xpstrid": "k", "xpathId": 1, "winningVhash": "h1",
            "items": { "h1": { "value": "foo" } }
        }));
        assert!(ConsistencyValidator::validate(&r).is_empty());
    }

    #[test]
    fn test_missing_winning_hash() {
        let r = row(json!({
            "xpstrid": "k", "xpathId": 1,
            "items": { "h1": { "value": "foo" } }
        }));
        assert_eq!(
            types(&ConsistencyValidator::validate(&r)),
            vec![ViolationType::MissingWinningHash]
        );
    }

    #[test]
    fn test_missing_items() {
        let r = row(json!({ "xpstrid": "k", "xpathId": 1, "winningVhash": "h1" }));
        assert_eq!(
            types(&ConsistencyValidator::validate(&r)),
            vec![ViolationType::MissingItems]
        );

        let r = row(json!({ "xpstrid": "k", "xpathId": 1 }));
        assert_eq!(
            types(&ConsistencyValidator::validate(&r)),
            vec![ViolationType::MissingWinningHash, ViolationType::MissingItems]
        );
    }

    #[test]
    fn test_dangling_winning_hash() {
        let r = row(json!({
            "xpstrid": "k", "xpathId": 1, "winningVhash": "gone",
            "items": { "h1": { "value": "foo" } }
        }));
        let violations = ConsistencyValidator::validate(&r);
        assert_eq!(types(&violations), vec![ViolationType::DanglingWinningHash]);
        assert_eq!(violations[0].severity, Severity::Error);
    }

    #[test]
    fn test_allow_listed_path_may_inherit_nothing() {
        let r = row(json!({
            "xpstrid": "k", "xpathId": 1, "winningVhash": "h1",
            "xpath": "//ldml/dates/timeZoneNames/zone[@type=\"Europe/Berlin\"]/exemplarCity",
            "items": { "h1": { "value": "↑↑↑" } }
        }));
        assert!(ConsistencyValidator::validate(&r).is_empty());
    }

    #[test]
    fn test_inheritance_without_target() {
        let r = row(json!({
            "xpstrid": "k", "xpathId": 1, "winningVhash": "h1",
            "xpath": "//ldml/localeDisplayNames/languages/language[@type=\"de\"]",
            "items": { "h1": { "value": "↑↑↑" } }
        }));
        assert_eq!(
            types(&ConsistencyValidator::validate(&r)),
            vec![ViolationType::InheritanceWithoutTarget]
        );
    }

    #[test]
    fn test_inheritance_missing_provenance_is_informational() {
        let r = row(json!({
            "xpstrid": "k", "xpathId": 1, "winningVhash": "h1",
            "inheritedValue": "German",
            "items": { "h1": { "value": "↑↑↑" } }
        }));
        let violations = ConsistencyValidator::validate(&r);
        assert_eq!(types(&violations), vec![ViolationType::InheritanceMissingProvenance]);
        assert_eq!(violations[0].severity, Severity::Info);

        let r = row(json!({
            "xpstrid": "k", "xpathId": 1, "winningVhash": "h1",
            "inheritedValue": "German", "inheritedLocale": "root",
            "items": { "h1": { "value": "↑↑↑" } }
        }));
        assert!(ConsistencyValidator::validate(&r).is_empty());
    }

    #[test]
    fn test_violations_reach_sink() {
        let sink = MemorySink::default();
        let r = row(json!({ "xpstrid": "k", "xpathId": 1 }));
        let violations = ConsistencyValidator::validate_and_report(&r, &sink);
        assert_eq!(sink.take(), violations);
    }
}
