//! Change notification: one full-inventory email per committed mutation.
//!
//! # Responsibility
//! - Queue trigger tokens from the service without blocking it.
//! - Snapshot, render and deliver the whole inventory per token.
//!
//! # Invariants
//! - The notifier never writes to the store.
//! - Each delivery opens its own store connection and transport session.
//! - Failures end in a log line; they are never retried or surfaced to the
//!   service caller.

mod dispatcher;
mod error;
pub mod export;
pub mod snapshot;
pub mod transport;

pub use dispatcher::{
    start_notifier, ChangeNotifier, DeliveryReceipt, NotificationRequest, NotifierPipeline,
    NotifierWorkers,
};
pub use error::{DeliveryStage, NotificationError};
pub use export::{render_inventory_xlsx, XLSX_CONTENT_TYPE};
pub use snapshot::{DbSnapshotSource, SnapshotSource};
pub use transport::{
    build_email, MessageAttachment, MessageSettings, NotificationTransport, OutboundMessage,
    SmtpMailer, SmtpSettings, TransportError,
};
