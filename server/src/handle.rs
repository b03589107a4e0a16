use std::time::Duration;

use tokio::sync::oneshot;

use system::{Color, Raster, Shape, Username, WhiteboardError};

use crate::peer::PeerHandle;
use crate::server::{ServerCommand, ServerTx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Admitted,
    Denied,
}

/// Cloneable front door to the session task. Every call waits until the
/// task has applied it, broadcast included.
#[derive(Debug, Clone)]
pub struct WhiteboardHandle {
    tx: ServerTx,
}

impl WhiteboardHandle {
    pub fn new(tx: ServerTx) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ServerCommand,
    ) -> Result<T, WhiteboardError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(make(tx))
            .await
            .map_err(|_| WhiteboardError::SessionUnavailable)?;
        rx.await.map_err(|_| WhiteboardError::SessionUnavailable)
    }

    pub async fn draw(&self, shape: Shape) -> Result<(), WhiteboardError> {
        self.request(|tx| ServerCommand::AppendShape { shape, tx })
            .await
    }

    pub async fn draw_line(
        &self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
    ) -> Result<(), WhiteboardError> {
        self.draw(Shape::line(x1, y1, x2, y2, color)).await
    }

    pub async fn draw_rectangle(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
    ) -> Result<(), WhiteboardError> {
        self.draw(Shape::rectangle(x, y, width, height, color)).await
    }

    pub async fn draw_circle(
        &self,
        x: i32,
        y: i32,
        radius: i32,
        color: Color,
    ) -> Result<(), WhiteboardError> {
        self.draw(Shape::circle(x, y, radius, color)).await
    }

    pub async fn draw_oval(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        color: Color,
    ) -> Result<(), WhiteboardError> {
        self.draw(Shape::oval(x, y, width, height, color)).await
    }

    pub async fn free_draw(
        &self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
    ) -> Result<(), WhiteboardError> {
        self.draw(Shape::free_draw(x1, y1, x2, y2, color)).await
    }

    pub async fn erase(&self, x: i32, y: i32, size: i32) -> Result<(), WhiteboardError> {
        self.draw(Shape::eraser(x, y, size)).await
    }

    pub async fn draw_text(
        &self,
        x: i32,
        y: i32,
        text: impl Into<String>,
        color: Color,
    ) -> Result<(), WhiteboardError> {
        self.draw(Shape::text(x, y, text, color)).await
    }

    pub async fn clear_shapes(&self) -> Result<(), WhiteboardError> {
        self.request(|tx| ServerCommand::ClearShapes { tx }).await
    }

    pub async fn load_image(&self, bytes: Vec<u8>) -> Result<(), WhiteboardError> {
        self.request(|tx| ServerCommand::LoadImage { bytes, tx })
            .await?
    }

    pub async fn get_shapes(&self) -> Result<Vec<Shape>, WhiteboardError> {
        self.request(|tx| ServerCommand::GetShapes { tx }).await
    }

    pub async fn get_canvas_image(&self) -> Result<Raster, WhiteboardError> {
        self.request(|tx| ServerCommand::GetCanvasImage { tx }).await
    }

    pub async fn get_user_list(&self) -> Result<Vec<Username>, WhiteboardError> {
        self.request(|tx| ServerCommand::GetUserList { tx }).await
    }

    pub async fn get_messages(&self) -> Result<Vec<String>, WhiteboardError> {
        self.request(|tx| ServerCommand::GetMessages { tx }).await
    }

    pub async fn add_user(
        &self,
        username: impl Into<Username>,
        handle: PeerHandle,
    ) -> Result<(), WhiteboardError> {
        let username = username.into();
        self.request(|tx| ServerCommand::AddUser {
            username,
            handle,
            tx,
        })
        .await?
    }

    pub async fn remove_user(&self, username: impl Into<Username>) -> Result<(), WhiteboardError> {
        let username = username.into();
        self.request(|tx| ServerCommand::RemoveUser { username, tx })
            .await
    }

    pub async fn set_manager(&self, username: impl Into<Username>) -> Result<(), WhiteboardError> {
        let username = username.into();
        self.request(|tx| ServerCommand::SetManager { username, tx })
            .await?
    }

    pub async fn get_manager(&self) -> Result<Option<Username>, WhiteboardError> {
        self.request(|tx| ServerCommand::GetManager { tx }).await
    }

    pub async fn send_message(
        &self,
        username: impl Into<Username>,
        text: impl Into<String>,
    ) -> Result<(), WhiteboardError> {
        let (username, text) = (username.into(), text.into());
        self.request(|tx| ServerCommand::SendMessage { username, text, tx })
            .await
    }

    pub async fn request_permission(
        &self,
        username: impl Into<Username>,
        handle: PeerHandle,
    ) -> Result<(), WhiteboardError> {
        let username = username.into();
        self.request(|tx| ServerCommand::RequestPermission {
            username,
            handle,
            tx,
        })
        .await?
    }

    pub async fn grant_permission(
        &self,
        username: impl Into<Username>,
    ) -> Result<(), WhiteboardError> {
        let username = username.into();
        self.request(|tx| ServerCommand::GrantPermission { username, tx })
            .await?
    }

    pub async fn deny_permission(
        &self,
        username: impl Into<Username>,
    ) -> Result<(), WhiteboardError> {
        let username = username.into();
        self.request(|tx| ServerCommand::DenyPermission { username, tx })
            .await?
    }

    pub async fn kick_out_user(&self, username: impl Into<Username>) -> Result<(), WhiteboardError> {
        let username = username.into();
        self.request(|tx| ServerCommand::KickOutUser { username, tx })
            .await?
    }

    pub async fn notify_closure(&self) -> Result<(), WhiteboardError> {
        self.request(|tx| ServerCommand::NotifyClosure { tx })
            .await?
    }

    pub async fn permission_requests_contains(
        &self,
        username: impl Into<Username>,
    ) -> Result<bool, WhiteboardError> {
        let username = username.into();
        self.request(|tx| ServerCommand::PermissionRequestsContains { username, tx })
            .await
    }

    pub async fn disconnect(
        &self,
        username: Option<Username>,
        peer: PeerHandle,
    ) -> Result<(), WhiteboardError> {
        self.request(|tx| ServerCommand::Disconnect { username, peer, tx })
            .await
    }

    /// Polls until `username` has left the pending set. Pending is checked
    /// before the roster: a grant moves the name in one step, so a name
    /// found in neither place was denied (or the session closed).
    pub async fn await_admission(
        &self,
        username: &str,
        period: Duration,
    ) -> Result<JoinOutcome, WhiteboardError> {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if self.permission_requests_contains(username).await? {
                continue;
            }
            return if self.get_user_list().await?.iter().any(|u| u == username) {
                Ok(JoinOutcome::Admitted)
            } else {
                Ok(JoinOutcome::Denied)
            };
        }
    }
}
