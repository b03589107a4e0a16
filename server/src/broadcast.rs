use crate::peer::PeerHandle;
use crate::peer_registry::PeerRegistry;
use system::{PeerCallback, RefreshKind};

/// Best-effort fan-out over a registry snapshot.
///
/// A peer that cannot take the notification is logged and skipped; the
/// remaining peers still get theirs and nothing is retried.
#[derive(Debug, Clone)]
pub struct BroadcastDispatcher {
    registry: PeerRegistry,
}

impl BroadcastDispatcher {
    pub fn new(registry: PeerRegistry) -> Self {
        Self { registry }
    }

    /// Returns how many peers accepted the refresh.
    pub async fn dispatch(&self, kind: RefreshKind) -> usize {
        self.notify_all(PeerCallback::from(kind)).await
    }

    pub async fn notify_all(&self, callback: PeerCallback) -> usize {
        let mut delivered = 0;
        for (username, handle) in self.registry.snapshot().await {
            if self.notify(&username, &handle, callback.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn notify(&self, username: &str, handle: &PeerHandle, callback: PeerCallback) -> bool {
        match handle.invoke(callback) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping notification to {}: {}", username, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use system::IdentifiableEvent;

    #[tokio::test]
    async fn it_delivers_once_per_peer_and_skips_dead_ones() {
        let registry = PeerRegistry::new();
        let (alive, mut alive_rx) = PeerHandle::channel(4);
        let (dead, dead_rx) = PeerHandle::channel(4);
        let (other, mut other_rx) = PeerHandle::channel(4);
        drop(dead_rx);
        registry.register("alive".into(), alive).await;
        registry.register("dead".into(), dead).await;
        registry.register("other".into(), other).await;

        let dispatcher = BroadcastDispatcher::new(registry);
        assert_eq!(dispatcher.dispatch(RefreshKind::Chat).await, 2);

        for rx in [&mut alive_rx, &mut other_rx].iter_mut() {
            assert_eq!(
                rx.try_recv().expect(""),
                IdentifiableEvent::BySystem {
                    callback: PeerCallback::RefreshChat
                }
            );
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn it_preserves_order_for_one_peer() {
        let registry = PeerRegistry::new();
        let (peer, mut rx) = PeerHandle::channel(4);
        registry.register("a".into(), peer).await;
        let dispatcher = BroadcastDispatcher::new(registry);

        dispatcher.dispatch(RefreshKind::Drawing).await;
        dispatcher.dispatch(RefreshKind::Roster).await;

        let kinds: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            kinds,
            vec![
                IdentifiableEvent::BySystem {
                    callback: PeerCallback::RefreshDrawing
                },
                IdentifiableEvent::BySystem {
                    callback: PeerCallback::RefreshRoster
                },
            ]
        );
    }
}
