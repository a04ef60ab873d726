pub mod models;
pub mod services;

pub use models::{
    Appointment, AppointmentError, AppointmentStatus, AppointmentType, BookingInput,
    BookingOutcome, BookingPayload,
};
pub use services::lifecycle::AppointmentLifecycle;
pub use services::store::AppointmentStore;
