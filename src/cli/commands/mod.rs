pub mod api;
pub mod logging;

use crate::settings::Tone;
use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const CMD_LOGIN: &str = "login";
pub const CMD_SIGNUP: &str = "signup";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_VISIT: &str = "visit";
pub const CMD_SETTINGS: &str = "settings";
pub const CMD_BUSINESS: &str = "business";
pub const CMD_ASSISTANT: &str = "assistant";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("portal")
        .about("AI assistant dashboard portal")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(login())
        .subcommand(signup())
        .subcommand(Command::new(CMD_LOGOUT).about("Clear the persisted session"))
        .subcommand(Command::new(CMD_WHOAMI).about("Show the signed-in user"))
        .subcommand(
            Command::new(CMD_VISIT)
                .about("Show what the portal does when a page is opened with the current session")
                .arg(Arg::new("path").help("Page path, example: /admin/dashboard").required(true)),
        )
        .subcommand(settings());

    let command = api::with_args(command);
    logging::with_args(command)
}

fn email_arg() -> Arg {
    Arg::new("email")
        .short('e')
        .long("email")
        .help("Account email")
        .env("PORTAL_EMAIL")
        .required(true)
}

fn password_arg() -> Arg {
    Arg::new("password")
        .short('p')
        .long("password")
        .help("Account password")
        .env("PORTAL_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn login() -> Command {
    Command::new(CMD_LOGIN)
        .about("Sign in and persist the session")
        .arg(email_arg())
        .arg(password_arg())
        .arg(
            Arg::new("admin")
                .long("admin")
                .help("Sign in through the admin entry; only admins are let through")
                .action(ArgAction::SetTrue),
        )
}

fn signup() -> Command {
    Command::new(CMD_SIGNUP)
        .about("Create a client account")
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .help("Display name")
                .required(true),
        )
        .arg(email_arg())
        .arg(password_arg())
        .arg(
            Arg::new("confirm-password")
                .long("confirm-password")
                .help("Password confirmation (defaults to --password)")
                .hide_env_values(true),
        )
}

fn settings() -> Command {
    Command::new(CMD_SETTINGS)
        .about("Update client-bot settings for the signed-in user")
        .subcommand_required(true)
        .subcommand(
            Command::new(CMD_BUSINESS)
                .about("Save business information")
                .arg(Arg::new("business-name").long("business-name").required(true))
                .arg(Arg::new("contact-person").long("contact-person").required(true))
                .arg(Arg::new("phone").long("phone").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("location").long("location").required(true)),
        )
        .subcommand(
            Command::new(CMD_ASSISTANT)
                .about("Save assistant tone, greeting and notification preference")
                .arg(
                    Arg::new("tone")
                        .long("tone")
                        .help("professional, friendly or casual")
                        .default_value(Tone::Professional.as_str())
                        .value_parser(|value: &str| value.parse::<Tone>()),
                )
                .arg(Arg::new("greeting").long("greeting").required(true))
                .arg(
                    Arg::new("email-notifications")
                        .long("email-notifications")
                        .default_value("true")
                        .value_parser(clap::value_parser!(bool)),
                ),
        )
}
