pub mod models;
pub mod services;

pub use models::{
    BookingWorkflow, Facility, IdentityBinding, ModalState, NoticeKind, Provider, SessionError,
    UserNotice,
};
pub use services::identity::{IdentityResolver, ResolvedIdentity};
pub use services::reference::ReferenceLoader;
pub use services::session::{AlwaysConfirm, CancelPrompt, SchedulingSession};
