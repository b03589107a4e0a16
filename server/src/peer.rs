use system::uuid::Uuid;
use system::{CommandId, CommandResult, IdentifiableEvent, PeerCallback, PeerId};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

pub type PeerTx = mpsc::Sender<IdentifiableEvent>;
pub type PeerRx = mpsc::Receiver<IdentifiableEvent>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("peer {0} is gone")]
    Closed(PeerId),

    #[error("peer {0} is not draining its queue")]
    Congested(PeerId),
}

/// Capability to call back into one connected peer.
///
/// Cloning keeps the same identity; two handles are equal iff they were
/// cloned from the same `PeerHandle::new`.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: PeerId,
    tx: PeerTx,
}

impl PeerHandle {
    pub fn new(tx: PeerTx) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
        }
    }

    pub fn channel(capacity: usize) -> (Self, PeerRx) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    /// Never waits: a full queue is reported instead of stalling the session.
    pub fn invoke(&self, callback: PeerCallback) -> Result<(), TransportError> {
        self.tx
            .try_send(IdentifiableEvent::BySystem { callback })
            .map_err(|e| match e {
                TrySendError::Full(_) => TransportError::Congested(self.id),
                TrySendError::Closed(_) => TransportError::Closed(self.id),
            })
    }

    pub async fn reply(
        &self,
        command_id: CommandId,
        result: CommandResult,
    ) -> Result<(), TransportError> {
        self.tx
            .send(IdentifiableEvent::ByMyself { command_id, result })
            .await
            .map_err(|_| TransportError::Closed(self.id))
    }
}

impl PartialEq for PeerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PeerHandle {}
