//! Authentication: the session store, the HTTP transport behind it, persisted
//! storage, and the guards that gate the portal pages.

pub mod client;
pub mod forms;
pub mod guards;
pub mod state;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;
