use crate::{
    api::{ApiClient, errors::AppError},
    auth::guards::{GuardState, evaluate},
    cli::{actions::open_session, globals::GlobalArgs},
    routes::Area,
    settings::{AssistantSettings, BusinessInfo, SettingsClient},
};
use anyhow::{Result, anyhow, bail};

/// Token of the signed-in session. Settings live in the client portal, so
/// the same guard decision applies.
fn portal_token(globals: &GlobalArgs) -> Result<Option<String>> {
    globals.config.require_api_base()?;
    let session = open_session(&globals.config)?.snapshot();
    let config = Area::ClientPortal.guard_config().unwrap_or_default();
    if evaluate(&config, &session) != GuardState::Authorized {
        bail!("not signed in; run `portal login` first");
    }
    Ok(session.token().map(str::to_string))
}

fn settings_client(globals: &GlobalArgs) -> Result<SettingsClient> {
    Ok(SettingsClient::new(
        ApiClient::new(&globals.config)?,
        globals.config.collection_name.clone(),
    ))
}

/// Failures a retry may fix say so.
fn request_failed(err: AppError) -> anyhow::Error {
    if err.is_transient() {
        anyhow!("{err}. Please try again.")
    } else {
        err.into()
    }
}

/// # Errors
/// Returns an error for invalid input, a signed-out session or a failed request.
pub async fn save_business(info: &BusinessInfo, globals: &GlobalArgs) -> Result<()> {
    info.validate()
        .map_err(|errors| anyhow!("invalid input: {errors}"))?;
    let token = portal_token(globals)?;
    settings_client(globals)?
        .save_business_info(info, token.as_deref())
        .await
        .map_err(request_failed)?;
    println!("Business information updated successfully!");
    Ok(())
}

/// # Errors
/// Returns an error for invalid input, a signed-out session or a failed request.
pub async fn save_assistant(settings: &AssistantSettings, globals: &GlobalArgs) -> Result<()> {
    settings
        .validate()
        .map_err(|errors| anyhow!("invalid input: {errors}"))?;
    let token = portal_token(globals)?;
    settings_client(globals)?
        .save_assistant_settings(settings, token.as_deref())
        .await
        .map_err(request_failed)?;
    println!("Assistant settings updated successfully!");
    Ok(())
}
