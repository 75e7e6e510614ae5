// handlers/elevated/mod.rs - Handlers behind the admin gate
//
// Routes here are wrapped in `require_admin`, which applies whichever
// `AdminGate` the configuration selects.

pub mod users;

pub use users::{user_delete, user_list};
