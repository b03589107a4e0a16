#![allow(dead_code)]

use server::handle::WhiteboardHandle;
use server::peer::{PeerHandle, PeerRx};
use server::server::spawn_server;
use server::session_state::RosterPolicy;
use system::{IdentifiableEvent, PeerCallback};

pub struct FakePeer {
    pub handle: PeerHandle,
    pub rx: PeerRx,
}

impl FakePeer {
    pub fn new() -> Self {
        let (handle, rx) = PeerHandle::channel(256);
        Self { handle, rx }
    }

    /// Everything pushed to this peer so far, oldest first.
    pub fn callbacks(&mut self) -> Vec<PeerCallback> {
        let mut result = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            if let IdentifiableEvent::BySystem { callback } = event {
                result.push(callback);
            }
        }
        result
    }
}

/// Session with `alice` as manager, already on the roster.
pub async fn session_with_manager(policy: RosterPolicy) -> (WhiteboardHandle, FakePeer) {
    let whiteboard = spawn_server(policy);
    let mut alice = FakePeer::new();
    whiteboard.set_manager("alice").await.expect("");
    whiteboard
        .add_user("alice", alice.handle.clone())
        .await
        .expect("");
    alice.callbacks();
    (whiteboard, alice)
}

pub async fn admit(whiteboard: &WhiteboardHandle, username: &str) -> FakePeer {
    let peer = FakePeer::new();
    whiteboard
        .request_permission(username, peer.handle.clone())
        .await
        .expect("");
    whiteboard.grant_permission(username).await.expect("");
    peer
}
