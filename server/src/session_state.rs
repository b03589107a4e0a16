use crate::peer::PeerHandle;
use system::{Raster, Shape, Username, Violation, CANVAS_HEIGHT, CANVAS_WIDTH};

/// What `add_user` does with a name that is already on the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterPolicy {
    /// Append again, so the roster can list a name twice.
    AllowDuplicates,
    /// Leave the roster as is.
    Unique,
}

impl std::default::Default for RosterPolicy {
    fn default() -> Self {
        RosterPolicy::AllowDuplicates
    }
}

/// Canonical whiteboard data. Only the session task touches it, so every
/// method here runs as one indivisible step.
pub struct SessionState {
    shapes: Vec<Shape>,
    canvas: Raster,
    messages: Vec<String>,
    user_list: Vec<Username>,
    manager: Option<Username>,
    permission_requests: Vec<(Username, PeerHandle)>,
    closed: bool,
    roster_policy: RosterPolicy,
}

impl SessionState {
    pub fn new(roster_policy: RosterPolicy) -> Self {
        Self {
            shapes: Vec::new(),
            canvas: Raster::blank(CANVAS_WIDTH, CANVAS_HEIGHT),
            messages: Vec::new(),
            user_list: Vec::new(),
            manager: None,
            permission_requests: Vec::new(),
            closed: false,
            roster_policy,
        }
    }

    pub fn append_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn shapes(&self) -> Vec<Shape> {
        self.shapes.clone()
    }

    pub fn clear_canvas(&mut self) {
        self.shapes.clear();
        self.canvas = Raster::blank(CANVAS_WIDTH, CANVAS_HEIGHT);
    }

    pub fn replace_canvas(&mut self, canvas: Raster) {
        self.canvas = canvas;
        self.shapes.clear();
    }

    pub fn canvas(&self) -> Raster {
        self.canvas.clone()
    }

    pub fn append_message(&mut self, username: &str, text: &str) {
        self.messages.push(format!("{}: {}", username, text));
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.clone()
    }

    /// Returns false when the roster policy kept a duplicate out.
    pub fn add_user(&mut self, username: &str) -> Result<bool, Violation> {
        if self.closed {
            return Err(Violation::SessionClosed);
        }
        if self.roster_policy == RosterPolicy::Unique && self.contains_user(username) {
            return Ok(false);
        }
        self.user_list.push(username.to_owned());
        Ok(true)
    }

    /// Drops the first roster entry for `username`.
    pub fn remove_user(&mut self, username: &str) -> bool {
        if let Some(pos) = self.user_list.iter().position(|u| u == username) {
            self.user_list.remove(pos);
            true
        } else {
            false
        }
    }

    /// Drops every roster entry for `username`.
    pub fn purge_user(&mut self, username: &str) -> bool {
        let before = self.user_list.len();
        self.user_list.retain(|u| u != username);
        self.user_list.len() != before
    }

    pub fn contains_user(&self, username: &str) -> bool {
        self.user_list.iter().any(|u| u == username)
    }

    pub fn user_list(&self) -> Vec<Username> {
        self.user_list.clone()
    }

    pub fn set_manager(&mut self, username: &str) -> Result<(), Violation> {
        if self.closed {
            Err(Violation::SessionClosed)
        } else if self.manager.is_some() {
            Err(Violation::ManagerAlreadySet)
        } else {
            self.manager = Some(username.to_owned());
            Ok(())
        }
    }

    pub fn manager(&self) -> Option<&str> {
        self.manager.as_deref()
    }

    pub fn is_manager(&self, username: &str) -> bool {
        self.manager() == Some(username)
    }

    /// Returns false when `username` was already waiting.
    pub fn request_join(&mut self, username: &str, handle: PeerHandle) -> Result<bool, Violation> {
        if self.closed {
            return Err(Violation::SessionClosed);
        }
        if self.manager.is_none() {
            return Err(Violation::NoManager);
        }
        if self.is_pending(username) {
            return Ok(false);
        }
        self.permission_requests.push((username.to_owned(), handle));
        Ok(true)
    }

    pub fn is_pending(&self, username: &str) -> bool {
        self.permission_requests.iter().any(|(u, _)| u == username)
    }

    pub fn take_pending(&mut self, username: &str) -> Result<PeerHandle, Violation> {
        let pos = self
            .permission_requests
            .iter()
            .position(|(u, _)| u == username)
            .ok_or_else(|| Violation::NotPending(username.to_owned()))?;
        Ok(self.permission_requests.remove(pos).1)
    }

    /// Withdraws requests made through a connection that went away.
    pub fn drop_requests_from(&mut self, handle: &PeerHandle) -> Vec<Username> {
        let (gone, kept) = self
            .permission_requests
            .drain(..)
            .partition::<Vec<_>, _>(|(_, h)| h == handle);
        self.permission_requests = kept;
        gone.into_iter().map(|(u, _)| u).collect()
    }

    /// Leaves the session inert: nobody on the roster, no manager, nobody
    /// waiting, and no way to appoint a new manager.
    pub fn close(&mut self) {
        self.user_list.clear();
        self.manager = None;
        self.permission_requests.clear();
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use system::Color;

    fn handle() -> PeerHandle {
        PeerHandle::channel(1).0
    }

    #[test]
    fn it_clears_shapes_and_canvas() {
        let mut state = SessionState::new(RosterPolicy::default());
        state.append_shape(Shape::line(0, 0, 1, 1, Color::BLACK));
        state.replace_canvas(Raster::blank(2, 2));
        assert!(state.shapes().is_empty());

        state.append_shape(Shape::eraser(1, 1, 4));
        state.clear_canvas();
        assert!(state.shapes().is_empty());
        assert_eq!(state.canvas(), Raster::blank(CANVAS_WIDTH, CANVAS_HEIGHT));
    }

    #[test]
    fn it_hands_out_copies() {
        let mut state = SessionState::new(RosterPolicy::default());
        state.append_message("alice", "hi");
        let copy = state.messages();
        state.append_message("bob", "yo");
        assert_eq!(copy, vec!["alice: hi".to_owned()]);
        assert_eq!(state.messages().len(), 2);
    }

    #[test]
    fn it_follows_roster_policy_for_duplicates() {
        let mut lenient = SessionState::new(RosterPolicy::AllowDuplicates);
        assert_eq!(lenient.add_user("a"), Ok(true));
        assert_eq!(lenient.add_user("a"), Ok(true));
        assert_eq!(lenient.user_list(), vec!["a", "a"]);
        assert!(lenient.remove_user("a"));
        assert_eq!(lenient.user_list(), vec!["a"]);

        let mut strict = SessionState::new(RosterPolicy::Unique);
        assert_eq!(strict.add_user("a"), Ok(true));
        assert_eq!(strict.add_user("a"), Ok(false));
        assert_eq!(strict.user_list(), vec!["a"]);
    }

    #[test]
    fn it_sets_manager_only_once() {
        let mut state = SessionState::new(RosterPolicy::default());
        assert_eq!(state.set_manager("alice"), Ok(()));
        assert_eq!(state.set_manager("bob"), Err(Violation::ManagerAlreadySet));
        assert_eq!(state.manager(), Some("alice"));

        state.close();
        assert_eq!(state.manager(), None);
        assert_eq!(state.set_manager("bob"), Err(Violation::SessionClosed));
        assert_eq!(state.add_user("bob"), Err(Violation::SessionClosed));
    }

    #[test]
    fn it_keeps_join_requests_idempotent() {
        let mut state = SessionState::new(RosterPolicy::default());
        assert_eq!(
            state.request_join("bob", handle()),
            Err(Violation::NoManager)
        );

        state.set_manager("alice").expect("");
        let first = handle();
        assert_eq!(state.request_join("bob", first.clone()), Ok(true));
        assert_eq!(state.request_join("bob", handle()), Ok(false));
        assert!(state.is_pending("bob"));

        assert_eq!(state.take_pending("bob"), Ok(first));
        assert!(!state.is_pending("bob"));
        assert_eq!(
            state.take_pending("bob"),
            Err(Violation::NotPending("bob".into()))
        );
    }

    #[test]
    fn it_drops_requests_of_a_vanished_connection() {
        let mut state = SessionState::new(RosterPolicy::default());
        state.set_manager("alice").expect("");
        let gone = handle();
        state.request_join("bob", gone.clone()).expect("");
        state.request_join("carol", handle()).expect("");

        assert_eq!(state.drop_requests_from(&gone), vec!["bob".to_owned()]);
        assert!(!state.is_pending("bob"));
        assert!(state.is_pending("carol"));
    }
}
