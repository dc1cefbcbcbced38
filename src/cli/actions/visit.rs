use crate::{
    auth::{
        guards::{EntryGuard, HistoryNavigator, Rendered, RouteGuard},
        state::SessionContext,
    },
    cli::{actions::open_session, globals::GlobalArgs},
    routes::{Area, MenuItem, paths, resolve},
};
use anyhow::{Result, anyhow};
use std::sync::Arc;

#[derive(Debug, PartialEq, Eq)]
pub enum Visit {
    /// The page renders, with the area's menu.
    Shown(&'static [MenuItem]),
    Loading,
    Redirected(String),
}

/// Mounts the guard `area` uses against the current session and reports what
/// the visitor would see.
pub fn decide<T>(area: Area, context: &SessionContext<T>) -> Visit {
    let navigator = Arc::new(HistoryNavigator::new());
    let rendered = match (area, area.guard_config()) {
        (_, Some(config)) => {
            let mut guard = RouteGuard::new(config, navigator.clone());
            guard.mount(context);
            guard.render(|| area.menu())
        }
        (Area::Entry(_), None) => {
            let mut guard = EntryGuard::new(navigator.clone());
            guard.mount(context);
            guard.render(|| area.menu())
        }
        (_, None) => Rendered::Content(area.menu()),
    };

    match rendered {
        Rendered::Content(menu) => Visit::Shown(menu),
        Rendered::Loading => Visit::Loading,
        Rendered::Nothing => Visit::Redirected(
            navigator
                .current()
                .unwrap_or_else(|| paths::HOME.to_string()),
        ),
    }
}

/// # Errors
/// Returns an error for unknown paths or when the HTTP client cannot be built.
pub fn execute(path: &str, globals: &GlobalArgs) -> Result<()> {
    let area = resolve(path).ok_or_else(|| anyhow!("page not found: {path}"))?;
    let context = open_session(&globals.config)?;

    match decide(area, &context) {
        Visit::Shown(menu) => {
            println!("{path}: shown");
            for item in menu {
                println!("  {:<22} {}", item.label, item.path);
            }
        }
        Visit::Loading => println!("{path}: loading"),
        Visit::Redirected(to) => println!("{path}: redirected -> {to}"),
    }
    Ok(())
}
