mod busy;

pub mod client;
pub mod collection;
pub mod confirm;
pub mod detail;
pub mod error;
pub mod form;
pub mod toast;

pub use client::{TripClient, DEFAULT_API_BASE};
pub use collection::{CollectionState, DeleteOutcome, TripCollection};
pub use confirm::{AutoConfirm, ConfirmationGate};
pub use detail::{DetailState, GenerateOutcome, TripDetail};
pub use error::ApiError;
pub use form::{SubmitOutcome, TripField, TripForm};
pub use toast::{ToastMessage, ToastQueue, ToastVariant};
