//! Maps parsed arguments to the action to run and the shared settings.

use crate::{
    cli::{
        actions::{
            Action,
            auth::{LoginArgs, SignupArgs},
        },
        commands::{
            CMD_ASSISTANT, CMD_BUSINESS, CMD_LOGIN, CMD_LOGOUT, CMD_SETTINGS, CMD_SIGNUP,
            CMD_VISIT, CMD_WHOAMI, api,
        },
        globals::GlobalArgs,
    },
    settings::{AssistantSettings, BusinessInfo, Tone},
};
use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use secrecy::SecretString;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = GlobalArgs::from_options(api::Options::parse(matches));

    let action = match matches.subcommand() {
        Some((CMD_LOGIN, sub)) => Action::Login(LoginArgs {
            email: required(sub, "email")?,
            password: SecretString::from(required(sub, "password")?),
            admin: sub.get_flag("admin"),
        }),
        Some((CMD_SIGNUP, sub)) => {
            let password = required(sub, "password")?;
            let confirm_password = sub
                .get_one::<String>("confirm-password")
                .cloned()
                .unwrap_or_else(|| password.clone());
            Action::Signup(SignupArgs {
                name: required(sub, "name")?,
                email: required(sub, "email")?,
                password: SecretString::from(password),
                confirm_password: SecretString::from(confirm_password),
            })
        }
        Some((CMD_LOGOUT, _)) => Action::Logout,
        Some((CMD_WHOAMI, _)) => Action::Whoami,
        Some((CMD_VISIT, sub)) => Action::Visit {
            path: required(sub, "path")?,
        },
        Some((CMD_SETTINGS, sub)) => settings(sub)?,
        Some((other, _)) => bail!("unknown command: {other}"),
        None => bail!("missing command"),
    };

    Ok((action, globals))
}

fn settings(matches: &ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((CMD_BUSINESS, sub)) => Ok(Action::BusinessSettings(BusinessInfo {
            business_name: required(sub, "business-name")?,
            contact_person: required(sub, "contact-person")?,
            phone_number: required(sub, "phone")?,
            email: required(sub, "email")?,
            location: required(sub, "location")?,
        })),
        Some((CMD_ASSISTANT, sub)) => Ok(Action::AssistantSettings(AssistantSettings {
            tone: sub.get_one::<Tone>("tone").copied().unwrap_or_default(),
            greeting: required(sub, "greeting")?,
            email_notifications: sub
                .get_one::<bool>("email-notifications")
                .copied()
                .unwrap_or(true),
        })),
        _ => bail!("missing settings command"),
    }
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}
