// handlers/protected/mod.rs - session required
//
// Every handler here takes `AuthUser`, so a request without a valid session
// is rejected with 401 before the handler body runs. Ownership checks on
// individual records happen inside the handlers.

pub mod notifications;
pub mod payments;
pub mod properties;
pub mod session;
pub mod settings;
pub mod upload;
