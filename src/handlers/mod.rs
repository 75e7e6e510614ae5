// handlers/mod.rs - Request handlers grouped by access tier
//
// Public (no token) → Protected (token) → Elevated (admin gate). The
// program's resource handlers live in `data` and are public.

pub mod data;
pub mod elevated;
pub mod protected;
pub mod public;
