use crate::{
    auth::{
        forms::{LoginForm, SignupForm},
        guards::HistoryNavigator,
        state::Session,
    },
    cli::{actions::open_session, globals::GlobalArgs},
    routes::{
        Area, EntryPage,
        entry::{EntryOutcome, login_entry, logout_from, signup_entry},
    },
};
use anyhow::{Result, anyhow};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct LoginArgs {
    pub email: String,
    pub password: SecretString,
    pub admin: bool,
}

#[derive(Debug)]
pub struct SignupArgs {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

/// # Errors
/// Returns an error when the API is not configured or the login is refused.
pub async fn login(args: LoginArgs, globals: &GlobalArgs) -> Result<()> {
    globals.config.require_api_base()?;
    let context = open_session(&globals.config)?;
    let page = if args.admin {
        EntryPage::AdminLogin
    } else {
        EntryPage::Login
    };
    let form = LoginForm::new(args.email, args.password.expose_secret());

    report(login_entry(&context, page, &form).await)
}

/// # Errors
/// Returns an error when the API is not configured or the signup is refused.
pub async fn signup(args: SignupArgs, globals: &GlobalArgs) -> Result<()> {
    globals.config.require_api_base()?;
    let context = open_session(&globals.config)?;
    let form = SignupForm {
        name: args.name,
        email: args.email,
        password: args.password.expose_secret().to_string(),
        confirm_password: args.confirm_password.expose_secret().to_string(),
    };

    report(signup_entry(&context, &form).await)
}

/// # Errors
/// Returns an error when the HTTP client cannot be built.
pub fn logout(globals: &GlobalArgs) -> Result<()> {
    let context = open_session(&globals.config)?;
    let area = if context.is_admin() {
        Area::AdminPortal
    } else {
        Area::ClientPortal
    };
    let navigator = HistoryNavigator::new();

    let notice = logout_from(&context, area, &navigator);
    context.destroy();

    println!("{notice}");
    if let Some(to) = navigator.current() {
        println!("-> {to}");
    }
    Ok(())
}

/// # Errors
/// Returns an error when the HTTP client cannot be built.
pub fn whoami(globals: &GlobalArgs) -> Result<()> {
    let session = open_session(&globals.config)?.snapshot();
    println!("{}", describe(&session));
    Ok(())
}

fn describe(session: &Session) -> String {
    match session.user().filter(|_| session.is_authenticated()) {
        Some(user) => format!(
            "{} <{}> role={} status={} token={}",
            user.name,
            user.email,
            user.role,
            user.status,
            if session.token().is_some() {
                "present"
            } else {
                "none"
            }
        ),
        None => "not signed in".to_string(),
    }
}

/// Prints where the visitor lands; refusals become errors so the exit code
/// reflects them.
fn report(outcome: EntryOutcome) -> Result<()> {
    match outcome {
        EntryOutcome::Invalid(errors) => Err(anyhow!("invalid input: {errors}")),
        EntryOutcome::Rejected(notice) => Err(anyhow!(notice.text)),
        EntryOutcome::Denied { notice, redirect } => {
            println!("-> {redirect}");
            Err(anyhow!(notice.text))
        }
        EntryOutcome::Redirect { to, notice } => {
            println!("{notice}");
            println!("-> {to}");
            Ok(())
        }
    }
}
