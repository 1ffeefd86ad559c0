pub mod analytics;
pub mod notification;
pub mod payment;
pub mod property;
pub mod user;

pub use analytics::{Analytics, ListingRef, LocationCount, PartyRef, RecentTransaction, TypeCount};
pub use notification::Notification;
pub use payment::{Checkout, CheckoutRejection, Payment, PaymentStatus, PaymentType, Reservation, Settlement};
pub use property::{NewProperty, Property, PropertyChanges, PropertyStatus, PropertyType};
pub use user::{NewUser, ProfileChanges, Role, User, UserSummary};
