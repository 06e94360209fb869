//! Share/copy cascade.
//!
//! Tiers are tried in order. The first one that works ends the cascade, an
//! unavailable or failing tier hands over to the next, and a user who
//! dismisses the native share sheet ends it without any message.

use futures::future::LocalBoxFuture;

use crate::controller::Status;
use crate::error::ShareError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShareTier {
    /// `navigator.share`
    Native,
    /// `navigator.clipboard.writeText`
    Clipboard,
    /// Off-screen textarea plus the `copy` command.
    Selection,
}

impl ShareTier {
    pub const CASCADE: [ShareTier; 3] = [ShareTier::Native, ShareTier::Clipboard, ShareTier::Selection];
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Attempt {
    Succeeded,
    Cancelled,
    Unavailable,
    Failed(ShareError),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ShareRequest {
    pub title: String,
    /// Text offered to the native share sheet.
    pub text: String,
    /// Raw payload put on the clipboard.
    pub payload: String,
}

impl ShareRequest {
    pub fn for_payload(payload: &str) -> Self {
        Self {
            title: "QR Code".to_owned(),
            text: format!("Check out this QR code: {}", payload),
            payload: payload.to_owned(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ShareOutcome {
    Shared,
    Copied,
    Cancelled,
    Failed(ShareError),
}

impl ShareOutcome {
    /// Status line for this outcome; cancellation leaves the status alone.
    pub fn status(&self) -> Option<Status> {
        match self {
            ShareOutcome::Shared => Some(Status::success("Shared successfully!")),
            ShareOutcome::Copied => Some(Status::success("Data copied to clipboard!")),
            ShareOutcome::Cancelled => None,
            ShareOutcome::Failed(ShareError::NotCopied) => Some(Status::error("Could not copy data")),
            ShareOutcome::Failed(ShareError::Platform(_)) => Some(Status::error("Copy failed")),
        }
    }
}

pub trait SharePlatform {
    fn attempt<'a>(&'a self, tier: ShareTier, request: &'a ShareRequest) -> LocalBoxFuture<'a, Attempt>;
}

pub async fn share<P: SharePlatform + ?Sized>(platform: &P, request: &ShareRequest) -> ShareOutcome {
    let mut last_error = ShareError::Platform("no way to share or copy".to_owned());

    for tier in ShareTier::CASCADE.iter().copied() {
        match platform.attempt(tier, request).await {
            Attempt::Succeeded if tier == ShareTier::Native => return ShareOutcome::Shared,
            Attempt::Succeeded => return ShareOutcome::Copied,
            Attempt::Cancelled => return ShareOutcome::Cancelled,
            Attempt::Unavailable => {}
            Attempt::Failed(err) => last_error = err,
        }
    }
    ShareOutcome::Failed(last_error)
}
