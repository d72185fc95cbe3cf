//! Domain models serialized straight into API responses.
//!
//! Each model mirrors one table, plus the joined columns its read paths
//! decorate it with (category names on products, customer and courier names
//! on orders, live stock on cart rows).

pub mod address;
pub mod cart;
pub mod catalog;
pub mod delivery;
pub mod order;
pub mod support;
pub mod user;

pub use address::Address;
pub use cart::{Cart, CartItem};
pub use catalog::{Category, Product};
pub use delivery::DeliveryMan;
pub use order::{Order, OrderItem, OrderStats, StatusCount};
pub use support::{ContactMessage, ProductRequest};
pub use user::{CurrentUser, User, session_keys};
