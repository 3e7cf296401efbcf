//! Admin broadcast: one post fanned out to every known, non-blocked user
//!
//! Each recipient gets exactly one delivery attempt. A failed attempt marks the
//! recipient blocked (written through to the snapshot) and the batch moves on.

use std::collections::HashSet;
use std::time::Duration;

use crate::core::types::{FileRef, UserId};
use crate::registry::UserRegistry;
use crate::transport::{DeliveryError, Recipient, TextFormat, Transport};

/// Authored broadcast content
///
/// Photo takes priority over video, video over plain text; the text becomes the
/// caption when media is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub text: Option<String>,
    pub photo: Option<FileRef>,
    pub video: Option<FileRef>,
}

impl Post {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.photo.is_none() && self.video.is_none()
    }
}

/// Result of one broadcast run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub sent_count: usize,
    pub newly_blocked: HashSet<UserId>,
}

#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    pacing: Duration,
}

impl BroadcastDispatcher {
    /// `pacing` is the pause after every delivery attempt
    pub fn new(pacing: Duration) -> Self {
        Self { pacing }
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    pub async fn send<T: Transport + ?Sized>(
        &self,
        post: &Post,
        registry: &mut UserRegistry,
        transport: &T,
    ) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();
        if post.is_empty() {
            log::warn!("Refusing to broadcast an empty post");
            return outcome;
        }

        let recipients = registry.broadcast_candidates();
        log::info!("Broadcasting post to {} users", recipients.len());

        for user in recipients {
            match deliver(post, user, transport).await {
                Ok(()) => outcome.sent_count += 1,
                Err(e) => {
                    log::error!("Broadcast to user {} failed: {}", user, e);
                    registry.block(user);
                    outcome.newly_blocked.insert(user);
                }
            }

            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        log::info!(
            "Broadcast finished: {} sent, {} newly blocked",
            outcome.sent_count,
            outcome.newly_blocked.len()
        );
        outcome
    }
}

async fn deliver<T: Transport + ?Sized>(post: &Post, user: UserId, transport: &T) -> Result<(), DeliveryError> {
    let to = Recipient::User(user);
    let caption = post.text.as_deref();

    if let Some(photo) = &post.photo {
        transport.send_photo(&to, photo, caption, None).await
    } else if let Some(video) = &post.video {
        transport.send_video(&to, video, caption, None).await
    } else if let Some(text) = caption {
        transport.send_text(&to, text, TextFormat::Plain, None).await
    } else {
        Ok(())
    }
}
