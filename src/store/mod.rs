//! User store: data model, pure transitions, and derived pagination.
//!
//! The state is only ever changed by [`reduce`], which maps `(state, action)`
//! to the next state. [`UserStore`] wraps it with the mutable, observable
//! surface the UI talks to.
//!
pub mod avatar;
pub mod handle;
pub mod ids;

use serde::{Deserialize, Serialize};

pub use avatar::Avatars;
pub use handle::UserStore;
pub use ids::{IdGenerator, SequentialIds};

/// Number of users shown per page.
pub const PAGE_SIZE: usize = 6;

/// Message shown when the initial load fails for any reason.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load users. Please try again.";

pub type UserId = u64;

/// A user record as held by the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub avatar: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Editable user fields. Excludes `id` and `avatar`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserDraft {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

impl From<&User> for UserDraft {
    fn from(u: &User) -> Self {
        Self::new(&u.first_name, &u.last_name, &u.email)
    }
}

/// Authoritative store state. Pagination is derived, never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreState {
    pub all_users: Vec<User>,
    pub current_page: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl StoreState {
    /// Fresh state at startup: empty, page 1, waiting on the initial load.
    pub fn initial() -> Self {
        Self {
            all_users: Vec::new(),
            current_page: 1,
            loading: true,
            error: None,
        }
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.all_users.len())
    }

    pub fn visible_users(&self) -> &[User] {
        page_slice(&self.all_users, self.current_page)
    }

    pub fn find(&self, id: UserId) -> Option<&User> {
        self.all_users.iter().find(|u| u.id == id)
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.find(id).is_some()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            users: self.visible_users().to_vec(),
            current_page: self.current_page,
            total_pages: self.total_pages(),
            total_users: self.all_users.len(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::initial()
    }
}

/// `ceil(len / PAGE_SIZE)`; zero for an empty list.
pub fn total_pages(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// The 1-based `page` window over `users`. Pages outside the list are empty.
pub fn page_slice(users: &[User], page: usize) -> &[User] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(PAGE_SIZE).min(users.len());
    let end = page.saturating_mul(PAGE_SIZE).min(users.len());
    &users[start..end]
}

/// Read-only view handed to subscribers after every change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_users: usize,
    pub loading: bool,
    pub error: Option<String>,
}

/// State transitions understood by [`reduce`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SetUsers(Vec<User>),
    SetPage(usize),
    SetLoading(bool),
    SetError(Option<String>),
    AddUser(User),
    UpdateUser(User),
    DeleteUser(UserId),
}

/// Apply one action to the state. Unknown ids are silent no-ops.
pub fn reduce(mut state: StoreState, action: Action) -> StoreState {
    match action {
        Action::SetUsers(users) => {
            let mut unique: Vec<User> = Vec::with_capacity(users.len());
            for u in users {
                if !unique.iter().any(|seen| seen.id == u.id) {
                    unique.push(u);
                }
            }
            state.all_users = unique;
            state.loading = false;
        }
        Action::SetPage(page) => state.current_page = page,
        Action::SetLoading(loading) => state.loading = loading,
        Action::SetError(error) => {
            state.error = error;
            state.loading = false;
        }
        Action::AddUser(user) => {
            if !state.contains(user.id) {
                state.all_users.insert(0, user);
            }
        }
        Action::UpdateUser(user) => {
            if let Some(slot) = state.all_users.iter_mut().find(|u| u.id == user.id) {
                *slot = user;
            }
        }
        Action::DeleteUser(id) => state.all_users.retain(|u| u.id != id),
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_user(id: UserId, first: &str) -> User {
        User {
            id,
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            email: format!("{}@example.com", first.to_lowercase()),
            avatar: format!("https://example.com/{id}.png"),
        }
    }

    fn seeded(n: u64) -> StoreState {
        reduce(
            StoreState::initial(),
            Action::SetUsers((1..=n).map(|i| mk_user(i, &format!("U{i}"))).collect()),
        )
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(6), 1);
        assert_eq!(total_pages(7), 2);
        assert_eq!(total_pages(12), 2);
        assert_eq!(total_pages(13), 3);
    }

    #[test]
    fn visible_users_is_window_of_current_page() {
        let mut state = seeded(14);
        let ids: Vec<UserId> = state.visible_users().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

        state = reduce(state, Action::SetPage(3));
        let ids: Vec<UserId> = state.visible_users().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![13, 14]);
    }

    #[test]
    fn out_of_range_pages_are_empty_not_clamped() {
        let state = reduce(seeded(8), Action::SetPage(5));
        assert_eq!(state.current_page, 5);
        assert!(state.visible_users().is_empty());

        let state = reduce(state, Action::SetPage(0));
        assert_eq!(state.current_page, 0);
        assert!(state.visible_users().is_empty());
    }

    #[test]
    fn set_users_clears_loading_and_drops_duplicate_ids() {
        let state = reduce(
            StoreState::initial(),
            Action::SetUsers(vec![mk_user(1, "A"), mk_user(2, "B"), mk_user(1, "C")]),
        );
        assert!(!state.loading);
        assert_eq!(state.all_users.len(), 2);
        assert_eq!(state.all_users[0].first_name, "A");
    }

    #[test]
    fn set_error_keeps_users_and_stops_loading() {
        let state = reduce(
            seeded(3),
            Action::SetError(Some(LOAD_ERROR_MESSAGE.to_string())),
        );
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some(LOAD_ERROR_MESSAGE));
        assert_eq!(state.all_users.len(), 3);
    }

    #[test]
    fn add_user_prepends_and_ignores_taken_id() {
        let state = reduce(seeded(2), Action::AddUser(mk_user(99, "New")));
        assert_eq!(state.all_users[0].id, 99);
        assert_eq!(state.all_users.len(), 3);

        let again = reduce(state.clone(), Action::AddUser(mk_user(99, "Dup")));
        assert_eq!(again, state);
    }

    #[test]
    fn update_user_replaces_in_place() {
        let mut changed = mk_user(2, "Zoe");
        changed.email = "z@x.com".to_string();
        let state = reduce(seeded(3), Action::UpdateUser(changed.clone()));
        assert_eq!(state.all_users[1], changed);
        assert_eq!(state.all_users.len(), 3);

        let untouched = reduce(state.clone(), Action::UpdateUser(mk_user(42, "Ghost")));
        assert_eq!(untouched, state);
    }

    #[test]
    fn delete_user_is_idempotent() {
        let once = reduce(seeded(4), Action::DeleteUser(3));
        let twice = reduce(once.clone(), Action::DeleteUser(3));
        assert_eq!(once.all_users.len(), 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn snapshot_reports_derived_fields() {
        let snap = reduce(seeded(7), Action::SetPage(2)).snapshot();
        assert_eq!(snap.current_page, 2);
        assert_eq!(snap.total_pages, 2);
        assert_eq!(snap.total_users, 7);
        assert_eq!(snap.users.len(), 1);
        assert!(!snap.loading);
        assert!(snap.error.is_none());
    }
}
