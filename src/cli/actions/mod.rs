pub mod auth;
pub mod settings;
pub mod visit;

use crate::{
    api::ApiClient,
    auth::{client::HttpAuthTransport, state::SessionContext, storage::FileStorage},
    cli::globals::GlobalArgs,
    config::AppConfig,
    settings::{AssistantSettings, BusinessInfo},
};
use anyhow::Result;

#[derive(Debug)]
pub enum Action {
    Login(auth::LoginArgs),
    Signup(auth::SignupArgs),
    Logout,
    Whoami,
    Visit { path: String },
    BusinessSettings(BusinessInfo),
    AssistantSettings(AssistantSettings),
}

impl Action {
    /// Execute the action.
    ///
    /// # Errors
    /// Returns an error when the input is invalid, the backend refuses the
    /// request, or the session cannot be read.
    pub async fn execute(self, globals: &GlobalArgs) -> Result<()> {
        match self {
            Action::Login(args) => auth::login(args, globals).await,
            Action::Signup(args) => auth::signup(args, globals).await,
            Action::Logout => auth::logout(globals),
            Action::Whoami => auth::whoami(globals),
            Action::Visit { path } => visit::execute(&path, globals),
            Action::BusinessSettings(info) => settings::save_business(&info, globals).await,
            Action::AssistantSettings(assistant) => {
                settings::save_assistant(&assistant, globals).await
            }
        }
    }
}

/// Session backed by the configured storage file and API.
pub(crate) fn open_session(config: &AppConfig) -> Result<SessionContext<HttpAuthTransport>> {
    let api = ApiClient::new(config)?;
    Ok(SessionContext::open(
        FileStorage::new(&config.storage_path),
        HttpAuthTransport::new(api),
    ))
}
