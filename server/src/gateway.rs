//! Drawing, chat and roster mutations. Each one runs inside the session
//! task, so the state change and the broadcast it triggers are never
//! interleaved with another call.

use system::{PeerCallback, RefreshKind, Shape, Username, Violation, WhiteboardError};

use crate::peer::PeerHandle;
use crate::server::Whiteboard;

impl Whiteboard {
    pub(crate) async fn append_shape(&mut self, shape: Shape) {
        self.state.append_shape(shape);
        self.dispatcher.dispatch(RefreshKind::Drawing).await;
    }

    /// Empty text is the caller's business and is stored as given.
    pub(crate) async fn append_chat(&mut self, username: &str, text: &str) {
        self.state.append_message(username, text);
        self.dispatcher.dispatch(RefreshKind::Chat).await;
    }

    pub(crate) async fn clear_all(&mut self) {
        self.state.clear_canvas();
        self.dispatcher
            .notify_all(PeerCallback::ResetToolState)
            .await;
        self.dispatcher.dispatch(RefreshKind::Drawing).await;
    }

    pub(crate) async fn load_raster(&mut self, bytes: &[u8]) -> Result<(), WhiteboardError> {
        let canvas = self.codec.decode(bytes).map_err(|e| {
            log::warn!("Rejected image of {} bytes: {}", bytes.len(), e);
            e
        })?;
        self.state.replace_canvas(canvas);
        self.dispatcher.dispatch(RefreshKind::Drawing).await;
        Ok(())
    }

    pub(crate) async fn add_user(
        &mut self,
        username: Username,
        handle: PeerHandle,
    ) -> Result<(), WhiteboardError> {
        if !self.state.add_user(&username)? {
            log::debug!("{} is already on the roster", username);
        }
        self.registry.register(username, handle).await;
        self.dispatcher.dispatch(RefreshKind::Roster).await;
        Ok(())
    }

    pub(crate) async fn remove_user(&mut self, username: &str) {
        self.state.remove_user(username);
        self.registry.deregister(username).await;
        self.dispatcher.dispatch(RefreshKind::Roster).await;
    }

    pub(crate) async fn kick_out(&mut self, username: &str) -> Result<(), WhiteboardError> {
        if self.state.is_manager(username) {
            log::warn!("Refused to kick out manager {}", username);
            return Err(Violation::KickManager.into());
        }
        if !self.state.contains_user(username) {
            return Ok(());
        }

        if let Some(handle) = self.registry.get(username).await {
            self.dispatcher
                .notify(username, &handle, PeerCallback::ForceRemoved);
        }
        self.state.purge_user(username);
        self.registry.deregister(username).await;
        log::info!("Kicked out {}", username);
        self.dispatcher.dispatch(RefreshKind::Roster).await;
        Ok(())
    }

    pub(crate) async fn closure(&mut self) -> Result<(), WhiteboardError> {
        let manager = match self.state.manager() {
            Some(manager) => manager.to_owned(),
            None => return Err(Violation::NoManager.into()),
        };

        for (username, handle) in self.registry.snapshot().await {
            if username == manager {
                continue;
            }
            self.dispatcher
                .notify(&username, &handle, PeerCallback::SessionClosed);
            self.state.purge_user(&username);
            self.registry.deregister(&username).await;
        }
        self.dispatcher.dispatch(RefreshKind::Roster).await;

        self.registry.deregister(&manager).await;
        self.state.close();
        log::info!("Session closed by {}", manager);
        Ok(())
    }
}
