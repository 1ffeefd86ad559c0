// handlers/public/mod.rs - no session required
//
// Account creation, sign-in and read-only listing endpoints. Every input is
// validated here since there is no trusted caller context.

pub mod properties;
pub mod register;
pub mod session;
pub mod verify_admin;
