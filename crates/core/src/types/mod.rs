//! Shared newtype wrappers and enums.

pub mod email;
pub mod id;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use slug::Slug;
pub use status::{OrderStatus, RequestStatus, UserRole};
