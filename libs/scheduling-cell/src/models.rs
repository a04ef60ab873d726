use serde::{Deserialize, Serialize};

use appointment_cell::BookingInput;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub facility_id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// Provider reference record. The fallback `/users` listing uses
/// `user_id`, hence the alias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    #[serde(alias = "user_id")]
    pub provider_id: i64,
    #[serde(default, alias = "full_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// Role-derived booking defaults. A patient always books as themselves; a
/// physician always books against their own provider id. Neither is
/// overridable from the form: `apply` runs after the form is filled and
/// wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityBinding {
    Patient { patient_id: i64 },
    Physician { provider_id: i64 },
    Staff,
}

impl IdentityBinding {
    pub fn apply(&self, input: &mut BookingInput) {
        match self {
            IdentityBinding::Patient { patient_id } => input.patient_id = Some(*patient_id),
            IdentityBinding::Physician { provider_id } => input.provider_id = Some(*provider_id),
            IdentityBinding::Staff => {}
        }
    }

    pub fn is_patient(&self) -> bool {
        matches!(self, IdentityBinding::Patient { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    AddOpen,
    EditOpen(i64),
}

/// Booking workflow state machine. One modal at a time; a failed submit
/// keeps the modal open with the error on display, a successful one
/// closes it.
#[derive(Debug, Clone, Default)]
pub struct BookingWorkflow {
    modal: ModalState,
    last_error: Option<String>,
}

impl BookingWorkflow {
    pub fn modal(&self) -> ModalState {
        self.modal
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Open the add modal. No-op unless everything is closed.
    pub fn open_add(&mut self) -> bool {
        if self.modal != ModalState::Closed {
            return false;
        }
        self.modal = ModalState::AddOpen;
        self.last_error = None;
        true
    }

    pub fn open_edit(&mut self, appointment_id: i64) -> bool {
        if self.modal != ModalState::Closed {
            return false;
        }
        self.modal = ModalState::EditOpen(appointment_id);
        self.last_error = None;
        true
    }

    pub fn close(&mut self) {
        self.modal = ModalState::Closed;
        self.last_error = None;
    }

    pub fn submit_succeeded(&mut self) {
        self.close();
    }

    pub fn submit_failed(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

/// One user-facing outcome for a session action, ready for a toast or
/// banner. Mutation failures always surface as one of these; they never
/// escape the orchestration loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotice {
    pub kind: NoticeKind,
    pub text: String,
}

impl UserNotice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Could not resolve identity: {0}")]
    Identity(String),
}
