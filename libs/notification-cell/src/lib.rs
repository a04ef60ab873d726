pub mod models;
pub mod services;

pub use models::{Notification, NotificationEnvelope, NotificationError};
pub use services::feed::NotificationFeed;
pub use services::push::{PushChannel, PushEvent};
