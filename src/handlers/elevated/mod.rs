// handlers/elevated/mod.rs - ADMIN role required
//
// Handlers take `AdminUser`: 401 without a session, 403 for any other role.

pub mod admin;
