// handlers/public/auth/mod.rs - Account creation and token acquisition

pub mod login;
pub mod register;

pub use login::login_post;
pub use register::register_post;
