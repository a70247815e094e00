//! Fan-out of one subscriber's message to every other subscriber.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::{
    domain::{Ack, ChatId, InboundMessage},
    errors::Error,
    nickname::assign_nickname,
    payload::{Content, OutboundPayload},
    ports::TransportPort,
    relay::Relay,
    Result,
};

/// Outcome of one recipient's outbound call.
#[derive(Debug)]
pub struct Delivery {
    pub chat_id: ChatId,
    pub result: Result<Ack>,
}

/// Per-recipient results of a forward, in roster order.
#[derive(Debug)]
pub struct ForwardReport {
    pub payload: OutboundPayload,
    pub deliveries: Vec<Delivery>,
}

impl ForwardReport {
    pub fn recipients(&self) -> impl Iterator<Item = ChatId> + '_ {
        self.deliveries.iter().map(|d| d.chat_id)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| d.result.is_err())
    }

    pub fn delivered(&self) -> usize {
        self.deliveries.iter().filter(|d| d.result.is_ok()).count()
    }
}

impl Relay {
    /// Relay `message` to every subscriber except its sender.
    ///
    /// The roster is read once and used as a snapshot for the whole call.
    /// Registry and nickname failures abort; recipient failures are logged and
    /// recorded in the report without affecting the others.
    pub async fn forward(&self, message: &InboundMessage) -> Result<ForwardReport> {
        self.forward_content(message, &Content::of(message)).await
    }

    /// Like `forward`, with the content already classified by the router.
    pub(crate) async fn forward_content(
        &self,
        message: &InboundMessage,
        content: &Content,
    ) -> Result<ForwardReport> {
        let roster = self.registry.list().await.inspect_err(|e| {
            error!(sender = %message.sender, "unable to read the roster: {e}");
        })?;

        let nickname = assign_nickname(
            &roster,
            message.sender,
            &self.nicknames,
            self.clock.now(),
        )?;
        let payload = OutboundPayload::relay_of(content, message, nickname);

        let recipients: Vec<ChatId> = roster
            .into_iter()
            .filter(|c| *c != message.sender)
            .collect();
        debug!(
            sender = %message.sender,
            method = %payload.method,
            recipients = recipients.len(),
            "forwarding message"
        );

        let deliveries = fan_out(self.transport.clone(), &payload, &recipients).await;
        for delivery in &deliveries {
            if let Err(e) = &delivery.result {
                warn!(chat_id = %delivery.chat_id, "failed to forward message: {e}");
            }
        }

        Ok(ForwardReport {
            payload,
            deliveries,
        })
    }
}

/// Send `payload` to every recipient concurrently and wait for all of them.
///
/// Never fails as a whole: each recipient gets its own result, in input
/// order. A dispatch task that dies is reported as a transport failure.
/// Sends are detached tasks, so dropping this future does not cancel them.
pub async fn fan_out(
    transport: Arc<dyn TransportPort>,
    payload: &OutboundPayload,
    recipients: &[ChatId],
) -> Vec<Delivery> {
    let payload = Arc::new(payload.clone());
    let handles: Vec<_> = recipients
        .iter()
        .copied()
        .map(|chat_id| {
            let transport = transport.clone();
            let payload = payload.clone();
            let handle =
                tokio::spawn(async move { transport.send_to(&payload, chat_id).await });
            (chat_id, handle)
        })
        .collect();

    let mut deliveries = Vec::with_capacity(handles.len());
    for (chat_id, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!(%chat_id, "forward task did not complete: {e}");
                Err(Error::Transport {
                    chat_id,
                    reason: format!("dispatch task did not complete: {e}"),
                })
            }
        };
        deliveries.push(Delivery { chat_id, result });
    }
    deliveries
}
