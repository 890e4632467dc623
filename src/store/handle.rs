//! The mutable, observable store the UI holds.
//!
//! All writes go through [`reduce`](super::reduce) and are published on a
//! `watch` channel. The initial load runs as a tokio task owned by the store;
//! dropping the store aborts it, so a late result is never applied.
//!
use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use super::{
    Action, Avatars, IdGenerator, LOAD_ERROR_MESSAGE, Snapshot, StoreState, User, UserDraft,
    UserId, reduce,
};
use crate::api::{UserSource, load_initial};
use crate::error::Result;

/// Re-draws from the id generator before falling back to `max id + 1`.
const MAX_ID_DRAWS: usize = 64;

/// The in-flight initial load.
struct LoadTask {
    outcome: oneshot::Receiver<Result<Vec<User>>>,
    handle: JoinHandle<()>,
}

impl Drop for LoadTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct UserStore {
    state: StoreState,
    ids: Box<dyn IdGenerator>,
    avatars: Avatars,
    updates: watch::Sender<Snapshot>,
    load: Option<LoadTask>,
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("users", &self.state.all_users.len())
            .field("current_page", &self.state.current_page)
            .field("loading", &self.state.loading)
            .field("error", &self.state.error)
            .field("load_pending", &self.load.is_some())
            .finish()
    }
}

impl UserStore {
    /// A store in its startup state with no load attached. It stays
    /// `loading` until something is dispatched.
    pub fn new(ids: impl IdGenerator + 'static, avatars: Avatars) -> Self {
        let state = StoreState::initial();
        let (updates, _) = watch::channel(state.snapshot());
        Self {
            state,
            ids: Box::new(ids),
            avatars,
            updates,
            load: None,
        }
    }

    /// Create the store and start the initial load on the current tokio
    /// runtime. Must be called from within a runtime.
    pub fn spawn(
        source: Arc<dyn UserSource>,
        ids: impl IdGenerator + 'static,
        avatars: Avatars,
    ) -> Self {
        let mut store = Self::new(ids, avatars);
        let (tx, rx) = oneshot::channel();
        let task_avatars = store.avatars.clone();
        let handle = tokio::spawn(async move {
            let outcome = load_initial(source.as_ref(), &task_avatars).await;
            let _ = tx.send(outcome);
        });
        store.load = Some(LoadTask {
            outcome: rx,
            handle,
        });
        store.dispatch(Action::SetLoading(true));
        tracing::info!("initial user load started");
        store
    }

    /// Apply a finished initial load, if any. Returns `true` when state changed.
    pub fn poll_load(&mut self) -> bool {
        let Some(task) = self.load.as_mut() else {
            return false;
        };
        let outcome = match task.outcome.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(crate::error::simple_error("load task ended without a result"))
            }
        };
        self.load = None;
        self.finish_load(outcome);
        true
    }

    /// Wait for the initial load to finish and apply it.
    ///
    /// Cancel-safe: the load stays attached until its outcome has arrived, so
    /// dropping this future leaves it for a later `poll_load` or `settle`.
    pub async fn settle(&mut self) {
        let Some(task) = self.load.as_mut() else {
            return;
        };
        let outcome = match (&mut task.outcome).await {
            Ok(outcome) => outcome,
            Err(_) => Err(crate::error::simple_error("load task ended without a result")),
        };
        self.load = None;
        self.finish_load(outcome);
    }

    pub fn is_load_pending(&self) -> bool {
        self.load.is_some()
    }

    fn finish_load(&mut self, outcome: Result<Vec<User>>) {
        match outcome {
            Ok(users) => {
                tracing::info!(count = users.len(), "initial user load finished");
                self.dispatch(Action::SetUsers(users));
            }
            Err(err) => {
                tracing::warn!(error = %err, "initial user load failed");
                self.dispatch(Action::SetError(Some(LOAD_ERROR_MESSAGE.to_string())));
            }
        }
    }

    /// Apply an action and notify subscribers.
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        self.updates.send_replace(self.state.snapshot());
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Receiver that sees a fresh [`Snapshot`] after every change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    pub fn get_user_by_id(&self, id: UserId) -> Option<&User> {
        self.state.find(id)
    }

    /// Prepend a new user and return its id. The page is left alone.
    pub fn add_user(&mut self, draft: UserDraft, avatar: Option<String>) -> UserId {
        let id = self.fresh_id();
        let avatar = self
            .avatars
            .resolve(avatar, &draft.first_name, &draft.last_name);
        let user = User {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            avatar,
        };
        tracing::debug!(id, "adding user");
        self.dispatch(Action::AddUser(user));
        id
    }

    /// Replace the editable fields of `id`. Unknown ids are ignored.
    pub fn edit_user(&mut self, id: UserId, draft: UserDraft, avatar: Option<String>) {
        let Some(existing) = self.state.find(id) else {
            tracing::debug!(id, "edit of unknown user ignored");
            return;
        };
        let avatar = match avatar {
            Some(a) if !a.trim().is_empty() => a,
            _ => existing.avatar.clone(),
        };
        let user = User {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            avatar,
        };
        self.dispatch(Action::UpdateUser(user));
    }

    /// Remove `id` if present. The page is left alone.
    pub fn remove_user(&mut self, id: UserId) {
        if !self.state.contains(id) {
            return;
        }
        tracing::debug!(id, "removing user");
        self.dispatch(Action::DeleteUser(id));
    }

    /// Set the current page. No bounds check.
    pub fn set_page(&mut self, page: usize) {
        self.dispatch(Action::SetPage(page));
    }

    fn fresh_id(&mut self) -> UserId {
        for _ in 0..MAX_ID_DRAWS {
            let id = self.ids.next_id();
            if !self.state.contains(id) {
                return id;
            }
        }
        let fallback = self
            .state
            .all_users
            .iter()
            .map(|u| u.id)
            .max()
            .map_or(1, |max| max.saturating_add(1));
        tracing::warn!(fallback, "id generator kept returning taken ids");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SequentialIds;
    use crate::store::avatar::DEFAULT_AVATAR_SERVICE;

    fn store() -> UserStore {
        UserStore::new(
            SequentialIds::default(),
            Avatars::from_service(DEFAULT_AVATAR_SERVICE).unwrap(),
        )
    }

    #[test]
    fn fresh_ids_skip_taken_ones() {
        let mut s = store();
        s.dispatch(Action::SetUsers(vec![User {
            id: 1,
            first_name: "George".into(),
            last_name: "Bluth".into(),
            email: "george@x.com".into(),
            avatar: "a".into(),
        }]));
        let id = s.add_user(UserDraft::new("Ana", "Lopez", "a@x.com"), None);
        assert_eq!(id, 2);
    }

    #[test]
    fn stuck_generator_falls_back_past_max_id() {
        let mut s = UserStore::new(
            || 7u64,
            Avatars::from_service(DEFAULT_AVATAR_SERVICE).unwrap(),
        );
        s.dispatch(Action::SetUsers(vec![User {
            id: 7,
            first_name: "George".into(),
            last_name: "Bluth".into(),
            email: "george@x.com".into(),
            avatar: "a".into(),
        }]));
        let id = s.add_user(UserDraft::new("Ana", "Lopez", "a@x.com"), None);
        assert_eq!(id, 8);
        let next = s.add_user(UserDraft::new("Bo", "Diaz", "b@x.com"), None);
        assert_eq!(next, 9);
    }

    #[test]
    fn subscribers_see_every_change() {
        let mut s = store();
        let mut rx = s.subscribe();
        assert!(!rx.has_changed().unwrap());

        s.set_page(4);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().current_page, 4);
    }

    #[test]
    fn poll_without_load_is_noop() {
        let mut s = store();
        assert!(!s.poll_load());
        assert!(s.state().loading);
    }
}
