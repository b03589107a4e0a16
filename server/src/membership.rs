//! Join handshake: a requester waits in the pending set until the manager
//! grants or denies it. Denial is silent; the requester sees it by polling.

use system::{PeerCallback, RefreshKind, Username, WhiteboardError};

use crate::peer::PeerHandle;
use crate::server::Whiteboard;

impl Whiteboard {
    pub(crate) fn set_manager(&mut self, username: &str) -> Result<(), WhiteboardError> {
        self.state.set_manager(username).map_err(|e| {
            log::warn!("Refused to make {} manager: {}", username, e);
            e
        })?;
        log::info!("{} manages the session", username);
        Ok(())
    }

    /// Roster membership is not checked; callers ask for it first.
    pub(crate) async fn request_join(
        &mut self,
        username: Username,
        handle: PeerHandle,
    ) -> Result<(), WhiteboardError> {
        let requester = handle.id();
        if !self.state.request_join(&username, handle)? {
            return Ok(());
        }

        // A request is only recorded while a manager is in place.
        if let Some(manager) = self.state.manager().map(str::to_owned) {
            match self.registry.get(&manager).await {
                Some(manager_handle) => {
                    self.dispatcher.notify(
                        &manager,
                        &manager_handle,
                        PeerCallback::ManageJoinRequest {
                            username,
                            requester,
                        },
                    );
                }
                None => log::warn!(
                    "{} asked to join but manager {} has no callback",
                    username,
                    manager
                ),
            }
        }
        Ok(())
    }

    pub(crate) async fn grant(&mut self, username: &str) -> Result<(), WhiteboardError> {
        let handle = self.state.take_pending(username).map_err(|e| {
            log::warn!("Ignoring grant: {}", e);
            e
        })?;
        if !self.state.add_user(username)? {
            log::debug!("{} is already on the roster", username);
        }
        self.registry.register(username.to_owned(), handle).await;
        log::info!("{} joined the session", username);
        self.dispatcher.dispatch(RefreshKind::Roster).await;
        Ok(())
    }

    pub(crate) fn deny(&mut self, username: &str) -> Result<(), WhiteboardError> {
        self.state.take_pending(username).map_err(|e| {
            log::warn!("Ignoring denial: {}", e);
            e
        })?;
        log::info!("{} was denied", username);
        Ok(())
    }
}
