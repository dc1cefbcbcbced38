//! # Portal (AI assistant dashboard core)
//!
//! `portal` is the client-side core of the assistant dashboard. It owns the
//! session lifecycle, role gating for the admin and client portals, and the thin
//! API wrappers the dashboard pages call.
//!
//! ## Session
//!
//! A [`SessionContext`](auth::state::SessionContext) is constructed once per
//! process from a storage port and an auth transport. Login establishes the
//! session from the backend response; signup only creates the account. The role
//! is whatever the backend returned last and is never changed locally.
//!
//! ## Route guards
//!
//! Every protected page shell mounts a [`RouteGuard`](auth::guards::RouteGuard).
//! The guard starts in `Initializing`, decides once the session is readable, and
//! re-decides on every session change through an explicit subscription. Entry
//! pages use an [`EntryGuard`](auth::guards::EntryGuard) that forwards signed-in
//! sessions to their dashboard.
//!
//! Guards are UX only. Real access control must live on the API.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod routes;
pub mod settings;
pub mod validation;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
