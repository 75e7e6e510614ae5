// handlers/protected/mod.rs - Handlers behind the token gate
//
// Routes here are wrapped in `jwt_auth_middleware`; handlers receive the
// caller as an `AuthUser`.

pub mod me;

pub use me::me_get;
