use tokio::sync::mpsc::{channel, Sender};
use tokio::sync::oneshot;

use system::{
    BincodeRasterCodec, PeerId, Raster, RasterCodec, RefreshKind, Shape, Username,
    WhiteboardError,
};

use crate::broadcast::BroadcastDispatcher;
use crate::handle::WhiteboardHandle;
use crate::peer::PeerHandle;
use crate::peer_registry::PeerRegistry;
use crate::session_state::{RosterPolicy, SessionState};

pub type ServerTx = Sender<ServerCommand>;
type Reply<T> = oneshot::Sender<T>;

/// One queued call into the session task. Every variant carries the channel
/// its caller is blocked on.
#[derive(Debug)]
pub enum ServerCommand {
    AppendShape {
        shape: Shape,
        tx: Reply<()>,
    },
    SendMessage {
        username: Username,
        text: String,
        tx: Reply<()>,
    },
    ClearShapes {
        tx: Reply<()>,
    },
    LoadImage {
        bytes: Vec<u8>,
        tx: Reply<Result<(), WhiteboardError>>,
    },
    GetShapes {
        tx: Reply<Vec<Shape>>,
    },
    GetCanvasImage {
        tx: Reply<Raster>,
    },
    GetUserList {
        tx: Reply<Vec<Username>>,
    },
    GetMessages {
        tx: Reply<Vec<String>>,
    },
    AddUser {
        username: Username,
        handle: PeerHandle,
        tx: Reply<Result<(), WhiteboardError>>,
    },
    RemoveUser {
        username: Username,
        tx: Reply<()>,
    },
    SetManager {
        username: Username,
        tx: Reply<Result<(), WhiteboardError>>,
    },
    GetManager {
        tx: Reply<Option<Username>>,
    },
    RequestPermission {
        username: Username,
        handle: PeerHandle,
        tx: Reply<Result<(), WhiteboardError>>,
    },
    GrantPermission {
        username: Username,
        tx: Reply<Result<(), WhiteboardError>>,
    },
    DenyPermission {
        username: Username,
        tx: Reply<Result<(), WhiteboardError>>,
    },
    KickOutUser {
        username: Username,
        tx: Reply<Result<(), WhiteboardError>>,
    },
    NotifyClosure {
        tx: Reply<Result<(), WhiteboardError>>,
    },
    PermissionRequestsContains {
        username: Username,
        tx: Reply<bool>,
    },
    Disconnect {
        username: Option<Username>,
        peer: PeerHandle,
        tx: Reply<()>,
    },
}

pub(crate) struct Whiteboard {
    pub(crate) state: SessionState,
    pub(crate) registry: PeerRegistry,
    pub(crate) dispatcher: BroadcastDispatcher,
    pub(crate) codec: Box<dyn RasterCodec>,
}

impl Whiteboard {
    fn new(roster_policy: RosterPolicy, codec: Box<dyn RasterCodec>) -> Self {
        let registry = PeerRegistry::new();
        Self {
            state: SessionState::new(roster_policy),
            dispatcher: BroadcastDispatcher::new(registry.clone()),
            registry,
            codec,
        }
    }

    async fn handle_server_command(&mut self, command: ServerCommand) {
        // A caller that gave up waiting has dropped its receiver; the
        // mutation stands regardless, so send errors are ignored.
        match command {
            ServerCommand::AppendShape { shape, tx } => {
                let _ = tx.send(self.append_shape(shape).await);
            }
            ServerCommand::SendMessage { username, text, tx } => {
                let _ = tx.send(self.append_chat(&username, &text).await);
            }
            ServerCommand::ClearShapes { tx } => {
                let _ = tx.send(self.clear_all().await);
            }
            ServerCommand::LoadImage { bytes, tx } => {
                let _ = tx.send(self.load_raster(&bytes).await);
            }
            ServerCommand::GetShapes { tx } => {
                let _ = tx.send(self.state.shapes());
            }
            ServerCommand::GetCanvasImage { tx } => {
                let _ = tx.send(self.state.canvas());
            }
            ServerCommand::GetUserList { tx } => {
                let _ = tx.send(self.state.user_list());
            }
            ServerCommand::GetMessages { tx } => {
                let _ = tx.send(self.state.messages());
            }
            ServerCommand::AddUser {
                username,
                handle,
                tx,
            } => {
                let _ = tx.send(self.add_user(username, handle).await);
            }
            ServerCommand::RemoveUser { username, tx } => {
                let _ = tx.send(self.remove_user(&username).await);
            }
            ServerCommand::SetManager { username, tx } => {
                let _ = tx.send(self.set_manager(&username));
            }
            ServerCommand::GetManager { tx } => {
                let _ = tx.send(self.state.manager().map(str::to_owned));
            }
            ServerCommand::RequestPermission {
                username,
                handle,
                tx,
            } => {
                let _ = tx.send(self.request_join(username, handle).await);
            }
            ServerCommand::GrantPermission { username, tx } => {
                let _ = tx.send(self.grant(&username).await);
            }
            ServerCommand::DenyPermission { username, tx } => {
                let _ = tx.send(self.deny(&username));
            }
            ServerCommand::KickOutUser { username, tx } => {
                let _ = tx.send(self.kick_out(&username).await);
            }
            ServerCommand::NotifyClosure { tx } => {
                let _ = tx.send(self.closure().await);
            }
            ServerCommand::PermissionRequestsContains { username, tx } => {
                let _ = tx.send(self.state.is_pending(&username));
            }
            ServerCommand::Disconnect { username, peer, tx } => {
                let _ = tx.send(self.disconnect(username, peer).await);
            }
        }
    }

    /// Cleans up after a connection that went away. The manager leaving
    /// closes the session; anyone else just leaves the roster.
    async fn disconnect(&mut self, username: Option<Username>, peer: PeerHandle) {
        let withdrawn = self.state.drop_requests_from(&peer);
        if !withdrawn.is_empty() {
            log::info!("Withdrew join requests of {:?}", withdrawn);
        }

        let username = match username {
            Some(username) => username,
            None => return,
        };
        if self.state.is_manager(&username) {
            if !self.is_registered_as(&username, peer.id()).await {
                return;
            }
            log::info!("Manager {} disconnected, closing session", username);
            if let Err(e) = self.closure().await {
                log::warn!("Closing session after manager left failed: {}", e);
            }
        } else if self.registry.deregister_peer(&username, peer.id()).await {
            // A newer connection registered under the same name keeps it.
            self.state.remove_user(&username);
            self.dispatcher.dispatch(RefreshKind::Roster).await;
        }
    }

    async fn is_registered_as(&self, username: &str, peer_id: PeerId) -> bool {
        self.registry
            .get(username)
            .await
            .map_or(false, |handle| handle.id() == peer_id)
    }
}

pub fn spawn_server(roster_policy: RosterPolicy) -> WhiteboardHandle {
    spawn_server_with_codec(roster_policy, Box::new(BincodeRasterCodec))
}

pub fn spawn_server_with_codec(
    roster_policy: RosterPolicy,
    codec: Box<dyn RasterCodec>,
) -> WhiteboardHandle {
    let (srv_tx, mut srv_rx) = channel::<ServerCommand>(16);

    tokio::spawn(async move {
        let mut server = Box::new(Whiteboard::new(roster_policy, codec));

        while let Some(command) = srv_rx.recv().await {
            server.handle_server_command(command).await;
        }
        log::info!("Whiteboard session task terminated");
    });

    WhiteboardHandle::new(srv_tx)
}
