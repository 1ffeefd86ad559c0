// handlers/mod.rs - three security tiers
//
// Public (no session) → Protected (AuthUser extractor) → Elevated (AdminUser extractor)

pub mod elevated;
pub mod protected;
pub mod public;
pub mod validate;
