pub mod checkin;
pub mod order;
pub mod photo;

pub use checkin::{CheckIn, GeoPoint};
pub use order::{Order, OrderStatus, StatusHistoryEntry};
pub use photo::Photo;
