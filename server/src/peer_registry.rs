use crate::peer::PeerHandle;
use std::collections::HashMap;
use std::sync::Arc;
use system::{PeerId, Username};
use tokio::sync::RwLock;

/// Username to callback map, shared outside the session task so fan-out can
/// read it while connections come and go.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    peers: Arc<RwLock<HashMap<Username, PeerHandle>>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any handle already registered under `username`.
    pub async fn register(&self, username: Username, handle: PeerHandle) -> Option<PeerHandle> {
        self.peers.write().await.insert(username, handle)
    }

    pub async fn deregister(&self, username: &str) -> Option<PeerHandle> {
        self.peers.write().await.remove(username)
    }

    /// Removes the entry only if it still points at `peer_id`; a newer
    /// registration under the same name is left alone.
    pub async fn deregister_peer(&self, username: &str, peer_id: PeerId) -> bool {
        let mut peers = self.peers.write().await;
        if peers.get(username).map_or(false, |h| h.id() == peer_id) {
            peers.remove(username);
            true
        } else {
            false
        }
    }

    pub async fn get(&self, username: &str) -> Option<PeerHandle> {
        self.peers.read().await.get(username).cloned()
    }

    pub async fn snapshot(&self) -> Vec<(Username, PeerHandle)> {
        self.peers
            .read()
            .await
            .iter()
            .map(|(username, handle)| (username.clone(), handle.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn it_overwrites_duplicate_username() {
        let registry = PeerRegistry::new();
        let (first, _rx1) = PeerHandle::channel(1);
        let (second, _rx2) = PeerHandle::channel(1);

        assert!(registry.register("a".into(), first.clone()).await.is_none());
        assert_eq!(registry.register("a".into(), second.clone()).await, Some(first));
        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get("a").await, Some(second));
    }

    #[tokio::test]
    async fn it_keeps_snapshot_stable_while_registry_changes() {
        let registry = PeerRegistry::new();
        let (a, _rx_a) = PeerHandle::channel(1);
        let (b, _rx_b) = PeerHandle::channel(1);
        registry.register("a".into(), a).await;

        let snapshot = registry.snapshot().await;
        registry.register("b".into(), b).await;
        registry.deregister("a").await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].0, "a");
        assert_eq!(registry.snapshot().await[0].0, "b");
    }

    #[tokio::test]
    async fn it_ignores_stale_deregistration() {
        let registry = PeerRegistry::new();
        let (old, _rx1) = PeerHandle::channel(1);
        let (new, _rx2) = PeerHandle::channel(1);
        registry.register("a".into(), old.clone()).await;
        registry.register("a".into(), new.clone()).await;

        assert!(!registry.deregister_peer("a", old.id()).await);
        assert!(registry.deregister_peer("a", new.id()).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn it_tolerates_concurrent_churn_and_snapshots() {
        let registry = PeerRegistry::new();
        let mut tasks = Vec::new();
        for i in 0..16 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let (handle, _rx) = PeerHandle::channel(1);
                let name = format!("user-{}", i);
                for _ in 0..50 {
                    registry.register(name.clone(), handle.clone()).await;
                    let snapshot = registry.snapshot().await;
                    assert!(snapshot.len() <= 16);
                    registry.deregister(&name).await;
                }
                registry.register(name, handle).await;
            }));
        }
        for task in tasks {
            task.await.expect("");
        }
        assert_eq!(registry.len().await, 16);
    }
}
