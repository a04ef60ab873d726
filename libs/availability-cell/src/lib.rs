pub mod models;
pub mod services;

pub use models::{AvailabilityStatus, Slot, WindowCheck};
pub use services::resolver::AvailabilityResolver;
