// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-process broadcast channel for `PipelineEvent` (§6, AS.2). We specify
//! the channel, not the consumer: an external monitor process is expected
//! to subscribe, but nothing in this crate reads its own broadcasts except
//! tests.

use docforge_domain::events::PipelineEvent;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publishes an event. A lagging or absent subscriber is not this
    /// publisher's problem - `send` only fails when there are zero
    /// receivers, which is the expected steady state with no monitor
    /// attached.
    pub fn publish(&self, event: PipelineEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docforge_domain::value_objects::{CorrelationId, DocumentId, StageName};

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(PipelineEvent::StageStarted {
            document_id: DocumentId::new(),
            stage: StageName::Upload,
            correlation_id: CorrelationId::generate(1),
        });

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, PipelineEvent::StageStarted { .. }));
    }
}
