//! Drives the state machine and delivers what it produces
//!
//! One event is processed completely, including every send and any broadcast
//! it triggers, before `process` returns. The bot wraps the engine in a mutex so
//! updates are handled strictly one at a time.

use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::broadcast::BroadcastDispatcher;
use crate::conversation::{Conversation, InboundEvent, OutboundAction, Payload};
use crate::transport::{DeliveryError, Keyboard, Recipient, Transport};

#[derive(Debug)]
pub struct Engine {
    conversation: Conversation,
    dispatcher: BroadcastDispatcher,
}

/// Counters for one processed event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub delivered: usize,
    pub failed: usize,
}

impl Engine {
    pub fn new(conversation: Conversation, dispatcher: BroadcastDispatcher) -> Self {
        Self {
            conversation,
            dispatcher,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Handles one event using today's local date
    pub async fn process<T: Transport + ?Sized>(&mut self, event: InboundEvent, transport: &T) -> ProcessReport {
        let today = chrono::Local::now().date_naive();
        self.process_on(event, today, transport).await
    }

    /// Handles one event as if it arrived on `today`
    pub async fn process_on<T: Transport + ?Sized>(
        &mut self,
        event: InboundEvent,
        today: NaiveDate,
        transport: &T,
    ) -> ProcessReport {
        let mut queue: VecDeque<OutboundAction> = self.conversation.handle_event(event, today).into();
        let mut report = ProcessReport::default();

        while let Some(action) = queue.pop_front() {
            match action {
                OutboundAction::Send { to, payload, keyboard } => {
                    match deliver(transport, &to, &payload, keyboard.as_ref()).await {
                        Ok(()) => report.delivered += 1,
                        Err(e) => {
                            log::warn!("Failed to deliver message to {}: {}", to, e);
                            report.failed += 1;
                        }
                    }
                }
                OutboundAction::Broadcast { admin, lang, post } => {
                    let outcome = self
                        .dispatcher
                        .send(&post, self.conversation.registry_mut(), transport)
                        .await;
                    queue.extend(self.conversation.finish_broadcast(admin, lang, &outcome));
                }
            }
        }

        report
    }
}

/// Sends one payload with the matching transport call
pub async fn deliver<T: Transport + ?Sized>(
    transport: &T,
    to: &Recipient,
    payload: &Payload,
    keyboard: Option<&Keyboard>,
) -> Result<(), DeliveryError> {
    match payload {
        Payload::Text { text, format } => transport.send_text(to, text, *format, keyboard).await,
        Payload::Photo { file, caption } => transport.send_photo(to, file, caption.as_deref(), keyboard).await,
        Payload::Video { file, caption } => transport.send_video(to, file, caption.as_deref(), keyboard).await,
        Payload::Document { file, caption } => transport.send_document(to, file, caption.as_deref()).await,
    }
}
