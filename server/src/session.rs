use system::{CommandOutput, CommandResult, Username, WhiteboardCommand, WhiteboardError};

use crate::handle::WhiteboardHandle;
use crate::peer::PeerHandle;

/// One connected peer as seen by the session: its callback handle and the
/// username it bound itself to, if any.
pub struct PeerSession {
    whiteboard: WhiteboardHandle,
    peer: PeerHandle,
    username: Option<Username>,
}

impl PeerSession {
    pub fn new(whiteboard: WhiteboardHandle, peer: PeerHandle) -> Self {
        Self {
            whiteboard,
            peer,
            username: None,
        }
    }

    pub fn peer(&self) -> &PeerHandle {
        &self.peer
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub async fn execute(&mut self, command: WhiteboardCommand) -> CommandResult {
        self.run(command).await.into()
    }

    async fn run(&mut self, command: WhiteboardCommand) -> Result<CommandOutput, WhiteboardError> {
        let wb = &self.whiteboard;
        let output = match command {
            WhiteboardCommand::Draw(shape) => {
                wb.draw(shape).await?;
                CommandOutput::Done
            }
            WhiteboardCommand::ClearShapes => {
                wb.clear_shapes().await?;
                CommandOutput::Done
            }
            WhiteboardCommand::LoadImage(bytes) => {
                wb.load_image(bytes).await?;
                CommandOutput::Done
            }
            WhiteboardCommand::GetShapes => CommandOutput::Shapes(wb.get_shapes().await?),
            WhiteboardCommand::GetCanvasImage => {
                CommandOutput::CanvasImage(wb.get_canvas_image().await?)
            }
            WhiteboardCommand::GetUserList => CommandOutput::UserList(wb.get_user_list().await?),
            WhiteboardCommand::GetMessages => CommandOutput::Messages(wb.get_messages().await?),
            WhiteboardCommand::AddUser(username) => {
                wb.add_user(username.clone(), self.peer.clone()).await?;
                self.username = Some(username);
                CommandOutput::Done
            }
            WhiteboardCommand::RemoveUser(username) => {
                wb.remove_user(username.clone()).await?;
                if self.username.as_ref() == Some(&username) {
                    self.username = None;
                }
                CommandOutput::Done
            }
            WhiteboardCommand::SetManager(username) => {
                wb.set_manager(username).await?;
                CommandOutput::Done
            }
            WhiteboardCommand::GetManager => CommandOutput::Manager(wb.get_manager().await?),
            WhiteboardCommand::SendMessage { username, text } => {
                wb.send_message(username, text).await?;
                CommandOutput::Done
            }
            WhiteboardCommand::RequestPermission(username) => {
                wb.request_permission(username.clone(), self.peer.clone())
                    .await?;
                self.username = Some(username);
                CommandOutput::Done
            }
            WhiteboardCommand::GrantPermission(username) => {
                wb.grant_permission(username).await?;
                CommandOutput::Done
            }
            WhiteboardCommand::DenyPermission(username) => {
                wb.deny_permission(username).await?;
                CommandOutput::Done
            }
            WhiteboardCommand::KickOutUser(username) => {
                wb.kick_out_user(username).await?;
                CommandOutput::Done
            }
            WhiteboardCommand::NotifyClosure => {
                wb.notify_closure().await?;
                CommandOutput::Done
            }
            WhiteboardCommand::PermissionRequestsContains(username) => {
                CommandOutput::Contains(wb.permission_requests_contains(username).await?)
            }
        };
        Ok(output)
    }

    /// Runs when the transport drops: leaves the roster, withdraws pending
    /// requests, and closes the session if this peer was the manager.
    pub async fn close(self) {
        if let Err(e) = self.whiteboard.disconnect(self.username, self.peer).await {
            log::warn!("Could not clean up after peer: {}", e);
        }
    }
}
