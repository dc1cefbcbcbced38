use crate::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    pub business_name: String,
    pub contact_person: String,
    pub phone_number: String,
    pub email: String,
    pub location: String,
}

impl BusinessInfo {
    /// # Errors
    /// Returns the per-field failures when any constraint is unmet.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_chars(
            "business_name",
            &self.business_name,
            2,
            "Business name must be at least 2 characters",
        );
        errors.min_chars(
            "contact_person",
            &self.contact_person,
            2,
            "Contact person must be at least 2 characters",
        );
        errors.min_chars(
            "phone_number",
            &self.phone_number,
            7,
            "Phone number must be at least 7 characters",
        );
        errors.email("email", &self.email);
        errors.min_chars(
            "location",
            &self.location,
            3,
            "Location must be at least 3 characters",
        );
        errors.into_result()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Casual,
}

impl Tone {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Casual => "casual",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(Tone::Professional),
            "friendly" => Ok(Tone::Friendly),
            "casual" => Ok(Tone::Casual),
            other => Err(format!(
                "unknown tone '{other}' (expected professional, friendly or casual)"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantSettings {
    pub tone: Tone,
    pub greeting: String,
    pub email_notifications: bool,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            tone: Tone::Professional,
            greeting: String::new(),
            email_notifications: true,
        }
    }
}

impl AssistantSettings {
    /// # Errors
    /// Returns the per-field failures when any constraint is unmet.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_chars(
            "greeting",
            &self.greeting,
            5,
            "Greeting must be at least 5 characters",
        );
        errors.into_result()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BusinessInfoRequest<'a> {
    pub user_collection_name: &'a str,
    pub business_info: &'a BusinessInfo,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmailPreferences {
    pub feedback: bool,
    pub contact_us: bool,
    pub project_onboarding: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SettingRequest<'a, V> {
    pub user_collection_name: &'a str,
    pub key: &'a str,
    pub value: V,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BotProfileRequest<'a> {
    pub user_collection_name: &'a str,
    pub title: &'a str,
    pub system_prompt: &'a str,
    pub tone: Tone,
}
