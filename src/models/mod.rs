//! Data models for EquipSense

pub mod enums;
pub mod equipment;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use enums::{EquipmentStatus, RequestStatus};
pub use equipment::{Category, Equipment, EquipmentWithAvailability};
pub use request::{BorrowRequest, TransitionOutcome};
pub use user::{Identity, Role, User};
