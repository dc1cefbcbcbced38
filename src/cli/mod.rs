//! Command-line front end: argument parsing, logging setup, and the actions
//! that drive the session store, guards and settings client.

pub mod actions;
pub mod commands;
pub mod dispatch;
pub mod globals;
pub mod start;
pub mod telemetry;

pub use self::start::start;
