use async_trait::async_trait;

use super::ProviderError;
use crate::models::TaxSettings;

/// Access to per-taxpayer tax settings.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Returns the taxpayer's settings, creating a default row
    /// ([`TaxSettings::default_for`]) on first access. A missing row is
    /// therefore never an error; a row carrying an unknown regime or plan
    /// value is ([`ProviderError::Configuration`]).
    async fn settings_for(&self, taxpayer_id: i64) -> Result<TaxSettings, ProviderError>;

    /// Persists updated settings. The engine itself never calls this; it
    /// exists for the external settings-update path.
    async fn update_settings(&self, settings: &TaxSettings) -> Result<(), ProviderError>;
}
