pub mod extract;
pub mod guard;
pub mod response;
pub mod session;

pub use extract::{AdminUser, AuthUser, MaybeUser, ValidJson};
pub use guard::{guard_middleware, GuardDecision};
pub use response::{ApiResponse, ApiResult};
pub use session::{session_middleware, SessionContext};
