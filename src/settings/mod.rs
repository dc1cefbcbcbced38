//! Client-bot settings pages: business details and assistant behaviour.

pub mod client;
pub mod types;

pub use client::SettingsClient;
pub use types::{AssistantSettings, BusinessInfo, Tone};
