use crate::{CommandId, PeerId, Raster, Shape, Username, WhiteboardError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct IdentifiableCommand {
    pub command_id: CommandId,
    pub command: WhiteboardCommand,
}

/// Calls a peer can make against the session.
///
/// `AddUser` and `RequestPermission` bind the calling connection as the
/// callback for `username`; granting reuses whatever connection asked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WhiteboardCommand {
    Draw(Shape),
    ClearShapes,
    LoadImage(Vec<u8>),
    GetShapes,
    GetCanvasImage,
    GetUserList,
    GetMessages,
    AddUser(Username),
    RemoveUser(Username),
    SetManager(Username),
    GetManager,
    SendMessage { username: Username, text: String },
    RequestPermission(Username),
    GrantPermission(Username),
    DenyPermission(Username),
    KickOutUser(Username),
    NotifyClosure,
    PermissionRequestsContains(Username),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandOutput {
    Done,
    Shapes(Vec<Shape>),
    CanvasImage(Raster),
    UserList(Vec<Username>),
    Messages(Vec<String>),
    Manager(Option<Username>),
    Contains(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandResult {
    Ok(CommandOutput),
    Error(WhiteboardError),
}

impl From<Result<CommandOutput, WhiteboardError>> for CommandResult {
    fn from(result: Result<CommandOutput, WhiteboardError>) -> Self {
        match result {
            Ok(output) => CommandResult::Ok(output),
            Err(error) => CommandResult::Error(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IdentifiableEvent {
    ByMyself {
        command_id: CommandId,
        result: CommandResult,
    },
    BySystem {
        callback: PeerCallback,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefreshKind {
    Drawing,
    Chat,
    Roster,
}

/// Pushed by the session. Refreshes carry no state: the peer pulls it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerCallback {
    RefreshDrawing,
    RefreshChat,
    RefreshRoster,
    ResetToolState,
    ForceRemoved,
    SessionClosed,
    /// Sent to the manager only; answer with `GrantPermission` or
    /// `DenyPermission` for `username`.
    ManageJoinRequest {
        username: Username,
        requester: PeerId,
    },
}

impl From<RefreshKind> for PeerCallback {
    fn from(kind: RefreshKind) -> Self {
        match kind {
            RefreshKind::Drawing => PeerCallback::RefreshDrawing,
            RefreshKind::Chat => PeerCallback::RefreshChat,
            RefreshKind::Roster => PeerCallback::RefreshRoster,
        }
    }
}
