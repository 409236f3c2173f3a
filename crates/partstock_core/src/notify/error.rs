use crate::notify::transport::TransportError;
use crate::repo::part_repo::RepoError;
use rust_xlsxwriter::XlsxError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stages one notification passes through.
///
/// `Triggered → Snapshotting → Rendering → Sending → {Delivered | Failed}`.
/// There is no edge out of `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStage {
    Triggered,
    Snapshotting,
    Rendering,
    Sending,
    Delivered,
    Failed,
}

impl DeliveryStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Triggered => "triggered",
            Self::Snapshotting => "snapshotting",
            Self::Rendering => "rendering",
            Self::Sending => "sending",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

/// Background-only failure of one notification.
#[derive(Debug)]
pub enum NotificationError {
    Snapshot(RepoError),
    Render(XlsxError),
    Transport(TransportError),
}

impl NotificationError {
    /// Stage that was running when the failure happened.
    pub fn stage(&self) -> DeliveryStage {
        match self {
            Self::Snapshot(_) => DeliveryStage::Snapshotting,
            Self::Render(_) => DeliveryStage::Rendering,
            Self::Transport(_) => DeliveryStage::Sending,
        }
    }
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot(err) => write!(f, "inventory snapshot failed: {err}"),
            Self::Render(err) => write!(f, "inventory export failed: {err}"),
            Self::Transport(err) => write!(f, "notification delivery failed: {err}"),
        }
    }
}

impl Error for NotificationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Snapshot(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Transport(err) => Some(err),
        }
    }
}

impl From<RepoError> for NotificationError {
    fn from(value: RepoError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<XlsxError> for NotificationError {
    fn from(value: XlsxError) -> Self {
        Self::Render(value)
    }
}

impl From<TransportError> for NotificationError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}
