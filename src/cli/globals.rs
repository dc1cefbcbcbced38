use crate::{
    cli::commands::api::Options,
    config::{AppConfig, Overrides, apply_overrides, normalize_value},
};

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: AppConfig,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Layers flag and environment values over the defaults. Blank values are
    /// ignored.
    #[must_use]
    pub fn from_options(options: Options) -> Self {
        let mut config = AppConfig::default();
        apply_overrides(
            &mut config,
            Overrides {
                api_base_url: options.api_url.as_deref().and_then(normalize_value),
                storage_path: options.storage_path.as_deref().and_then(normalize_value),
                collection_name: options.collection.as_deref().and_then(normalize_value),
                timeout_seconds: options.timeout_seconds,
            },
        );
        Self { config }
    }
}
