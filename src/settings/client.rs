use crate::{
    api::{ApiClient, AppError},
    settings::types::{
        AssistantSettings, BotProfileRequest, BusinessInfo, BusinessInfoRequest, EmailPreferences,
        SettingRequest,
    },
};
use tracing::info;

pub const BOT_PATH: &str = "/api/client-bot";
pub const SETTING_PATH: &str = "/api/client-bot/settings/set";
pub const DEFAULT_BOT_TITLE: &str = "YantraBot";
const EMAIL_SETTING_KEY: &str = "email_enabled";

/// Writes client-bot configuration for one collection.
#[derive(Clone, Debug)]
pub struct SettingsClient {
    api: ApiClient,
    collection: String,
}

impl SettingsClient {
    pub fn new(api: ApiClient, collection: impl Into<String>) -> Self {
        Self {
            api,
            collection: collection.into(),
        }
    }

    /// # Errors
    /// Returns an error when the request fails or the backend answers non-2xx.
    pub async fn save_business_info(
        &self,
        info: &BusinessInfo,
        token: Option<&str>,
    ) -> Result<(), AppError> {
        let request = BusinessInfoRequest {
            user_collection_name: &self.collection,
            business_info: info,
        };
        self.api.post_json_empty(BOT_PATH, &request, token).await?;
        info!(collection = %self.collection, "business info saved");
        Ok(())
    }

    /// Stores the notification preference, then the bot profile. The profile is
    /// not written when the preference write fails.
    ///
    /// # Errors
    /// Returns the first failing request's error.
    pub async fn save_assistant_settings(
        &self,
        settings: &AssistantSettings,
        token: Option<&str>,
    ) -> Result<(), AppError> {
        let preference = SettingRequest {
            user_collection_name: &self.collection,
            key: EMAIL_SETTING_KEY,
            value: EmailPreferences {
                feedback: settings.email_notifications,
                contact_us: false,
                project_onboarding: true,
            },
        };
        self.api
            .post_json_empty(SETTING_PATH, &preference, token)
            .await?;

        let profile = BotProfileRequest {
            user_collection_name: &self.collection,
            title: DEFAULT_BOT_TITLE,
            system_prompt: &settings.greeting,
            tone: settings.tone,
        };
        self.api.post_json_empty(BOT_PATH, &profile, token).await?;
        info!(collection = %self.collection, tone = %settings.tone, "assistant settings saved");
        Ok(())
    }
}
