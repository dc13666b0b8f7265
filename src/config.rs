use serde::{Deserialize, Serialize};

use crate::logic::reconcile::ReconcileContext;
use crate::model::TextDirection;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub reconcile: ReconcileConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Skip rows whose checksum is unchanged since the last render
    pub checksum_skip: bool,
    /// Log every per-row decision at info level
    pub debug: bool,
    /// Sort view to render; the first view by name when unset
    pub preferred_sort_view: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub text_direction: TextDirection,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            checksum_skip: true,
            debug: false,
            preferred_sort_view: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        // Load environment variables from .env file if it exists
        dotenvy::dotenv().ok();

        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("vote-table").required(false));

        // Add environment variables with prefix "VOTETABLE_", e.g. VOTETABLE_RECONCILE__CHECKSUM_SKIP
        config = config.add_source(
            config::Environment::with_prefix("VOTETABLE")
                .separator("__")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Per-call context handed to the reconciliation entry points
    pub fn context(&self) -> ReconcileContext {
        ReconcileContext {
            debug: self.reconcile.debug,
            checksum_skip: self.reconcile.checksum_skip,
            text_direction: self.display.text_direction,
            sort_view: self.reconcile.preferred_sort_view.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.reconcile.checksum_skip);
        assert!(!config.reconcile.debug);
        assert_eq!(config.display.text_direction, TextDirection::Ltr);

        let ctx = config.context();
        assert!(ctx.checksum_skip);
        assert!(ctx.sort_view.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "reconcile": { "checksum_skip": false, "debug": true, "preferred_sort_view": "ph" },
                "display": { "text_direction": "rtl" }
            }"#,
        )
        .unwrap();
        let ctx = config.context();
        assert!(!ctx.checksum_skip);
        assert!(ctx.debug);
        assert_eq!(ctx.text_direction, TextDirection::Rtl);
        assert_eq!(ctx.sort_view.as_deref(), Some("ph"));
    }
}
