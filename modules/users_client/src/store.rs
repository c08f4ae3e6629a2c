use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::api::{HttpUsersApi, UsersApi};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{User, UserPatch, UserPayload};

/// In-memory state mirrored from the remote collection.
///
/// `loading` and `error` are shared across all actions rather than keyed per
/// action, so two concurrent actions overwrite each other's flags. That race
/// is accepted: the flags drive presentation, not correctness, and the store
/// provides no per-record mutual exclusion either; the later reconciliation
/// wins.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Ordered mirror of the remote collection. Order is whatever the last
    /// full fetch returned, plus local prepends from `create`.
    pub list: Vec<User>,
    /// The most recently individually-fetched record, if any.
    pub current: Option<User>,
    /// Emails of users created in the last 7 days.
    pub new_users: Vec<String>,
    /// Count reported together with `new_users`.
    pub total: u32,
    /// Rounded mean age reported by the backend.
    pub average_age: u32,
    /// True while any action's remote call is in flight.
    pub loading: bool,
    /// Last failure message; auto-cleared after the error TTL.
    pub error: Option<String>,
    /// Timestamp of the last successful full-list fetch.
    pub last_fetch: Option<Instant>,
}

struct Inner {
    api: Arc<dyn UsersApi>,
    state: Mutex<StoreState>,
    cache_ttl: std::time::Duration,
    error_ttl: std::time::Duration,
}

/// The client data store: one instance per application session, cloned
/// cheaply wherever it is consumed. All mutation goes through its actions;
/// every network-bound action sets `loading`, clears `error`, reconciles or
/// rolls back, and re-raises failures to the caller.
#[derive(Clone)]
pub struct UserStore {
    inner: Arc<Inner>,
}

const FETCH_FALLBACK: &str = "failed to load users";
const GET_ONE_FALLBACK: &str = "failed to load user";
const CREATE_FALLBACK: &str = "failed to create user";
const UPDATE_FALLBACK: &str = "failed to update user";
const REMOVE_FALLBACK: &str = "failed to delete user";
const NEW_USERS_FALLBACK: &str = "failed to load recent users";
const AVERAGE_AGE_FALLBACK: &str = "failed to load average age";

impl UserStore {
    /// Create a store over an explicit API port.
    pub fn new(api: Arc<dyn UsersApi>, config: &ClientConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                state: Mutex::new(StoreState::default()),
                cache_ttl: config.cache_ttl,
                error_ttl: config.error_ttl,
            }),
        }
    }

    /// Create a store backed by the reqwest adapter.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let api = HttpUsersApi::new(config)?;
        Ok(Self::new(Arc::new(api), config))
    }

    // ----- getters -----

    /// A point-in-time copy of the whole state.
    pub fn snapshot(&self) -> StoreState {
        self.inner.state.lock().clone()
    }

    pub fn list(&self) -> Vec<User> {
        self.inner.state.lock().list.clone()
    }

    pub fn current(&self) -> Option<User> {
        self.inner.state.lock().current.clone()
    }

    pub fn new_users(&self) -> Vec<String> {
        self.inner.state.lock().new_users.clone()
    }

    pub fn total(&self) -> u32 {
        self.inner.state.lock().total
    }

    pub fn average_age(&self) -> u32 {
        self.inner.state.lock().average_age
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.lock().error.clone()
    }

    /// Users sorted by name, without disturbing the stored order.
    pub fn users_sorted_by_name(&self) -> Vec<User> {
        let mut users = self.list();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        users
    }

    pub fn total_users(&self) -> usize {
        self.inner.state.lock().list.len()
    }

    pub fn user_by_id(&self, id: &str) -> Option<User> {
        self.inner
            .state
            .lock()
            .list
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.inner
            .state
            .lock()
            .list
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn is_cache_valid(&self) -> bool {
        let state = self.inner.state.lock();
        self.cache_valid(&state)
    }

    pub fn has_data(&self) -> bool {
        !self.inner.state.lock().list.is_empty()
    }

    // ----- plain actions -----

    pub fn clear_error(&self) {
        self.inner.state.lock().error = None;
    }

    /// Drop the fetch timestamp so the next `fetch` hits the network.
    pub fn invalidate_cache(&self) {
        self.inner.state.lock().last_fetch = None;
    }

    // ----- network-bound actions -----

    /// Replace the list wholesale from the server. Skipped when not forced,
    /// the cache window is still open and there is data to show.
    #[instrument(name = "users_client.store.fetch", skip(self))]
    pub async fn fetch(&self, force: bool) -> Result<(), ClientError> {
        {
            let state = self.inner.state.lock();
            if !force && self.cache_valid(&state) && !state.list.is_empty() {
                debug!("cache window still open, skipping fetch");
                return Ok(());
            }
        }

        self.begin();
        match self.inner.api.list().await {
            Ok(users) => {
                let mut state = self.inner.state.lock();
                state.list = users;
                state.last_fetch = Some(Instant::now());
                state.loading = false;
                Ok(())
            }
            Err(err) => {
                // A failed full fetch leaves nothing trustworthy to show.
                self.inner.state.lock().list.clear();
                self.fail(&err, FETCH_FALLBACK);
                self.finish();
                Err(err)
            }
        }
    }

    /// Return one record, from the local list when the cache window is open,
    /// from the server otherwise. Sets `current` either way and patches the
    /// list entry in place on a remote hit (list order unchanged).
    #[instrument(name = "users_client.store.get_one", skip(self), fields(user_id = %id))]
    pub async fn get_one(&self, id: &str) -> Result<User, ClientError> {
        {
            let mut state = self.inner.state.lock();
            if self.cache_valid(&state) {
                if let Some(user) = state.list.iter().find(|u| u.id == id).cloned() {
                    state.current = Some(user.clone());
                    return Ok(user);
                }
            }
        }

        self.begin();
        match self.inner.api.get(id).await {
            Ok(user) => {
                let mut state = self.inner.state.lock();
                state.current = Some(user.clone());
                if let Some(entry) = state.list.iter_mut().find(|u| u.id == id) {
                    *entry = user.clone();
                }
                state.loading = false;
                Ok(user)
            }
            Err(err) => {
                self.fail(&err, GET_ONE_FALLBACK);
                self.finish();
                Err(err)
            }
        }
    }

    /// Create a record; on success it is prepended to the list and the cache
    /// is invalidated so the next fetch re-reads the server's ordering.
    #[instrument(name = "users_client.store.create", skip(self, payload), fields(email = %payload.email))]
    pub async fn create(&self, payload: UserPayload) -> Result<User, ClientError> {
        self.begin();
        match self.inner.api.create(&payload).await {
            Ok(user) => {
                let mut state = self.inner.state.lock();
                state.list.insert(0, user.clone());
                state.last_fetch = None;
                state.loading = false;
                Ok(user)
            }
            Err(err) => {
                self.fail(&err, CREATE_FALLBACK);
                self.finish();
                Err(err)
            }
        }
    }

    /// Optimistically merge `patch` into the local record before the remote
    /// call; the server's full record replaces it on success, the exact
    /// pre-mutation snapshot is restored on failure. The remote call still
    /// proceeds when the id is not in the local list.
    #[instrument(name = "users_client.store.update", skip(self, patch), fields(user_id = %id))]
    pub async fn update(&self, id: &str, patch: UserPatch) -> Result<User, ClientError> {
        let snapshot = {
            let mut state = self.inner.state.lock();
            state.loading = true;
            state.error = None;
            match state.list.iter().position(|u| u.id == id) {
                Some(index) => {
                    let previous = state.list[index].clone();
                    apply_patch(&mut state.list[index], &patch);
                    Some((index, previous))
                }
                None => None,
            }
        };

        match self.inner.api.update(id, &patch).await {
            Ok(user) => {
                let mut state = self.inner.state.lock();
                if let Some((index, _)) = &snapshot {
                    if let Some(entry) = state.list.get_mut(*index) {
                        *entry = user.clone();
                    }
                }
                state.last_fetch = None;
                state.loading = false;
                Ok(user)
            }
            Err(err) => {
                {
                    let mut state = self.inner.state.lock();
                    if let Some((index, previous)) = snapshot {
                        if let Some(entry) = state.list.get_mut(index) {
                            *entry = previous;
                        }
                    }
                }
                self.fail(&err, UPDATE_FALLBACK);
                self.finish();
                Err(err)
            }
        }
    }

    /// Optimistically drop the record before the remote call; on failure it
    /// is re-inserted at its original index, not appended.
    #[instrument(name = "users_client.store.remove", skip(self), fields(user_id = %id))]
    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        let removed = {
            let mut state = self.inner.state.lock();
            state.loading = true;
            state.error = None;
            state
                .list
                .iter()
                .position(|u| u.id == id)
                .map(|index| (index, state.list.remove(index)))
        };

        match self.inner.api.delete(id).await {
            Ok(()) => {
                let mut state = self.inner.state.lock();
                state.last_fetch = None;
                state.loading = false;
                Ok(())
            }
            Err(err) => {
                {
                    let mut state = self.inner.state.lock();
                    if let Some((index, user)) = removed {
                        let at = index.min(state.list.len());
                        state.list.insert(at, user);
                    }
                }
                self.fail(&err, REMOVE_FALLBACK);
                self.finish();
                Err(err)
            }
        }
    }

    /// Refresh the 7-day window. Skipped when not forced and both the email
    /// list and its count are already populated.
    #[instrument(name = "users_client.store.fetch_new_users", skip(self))]
    pub async fn fetch_new_users(&self, force: bool) -> Result<(), ClientError> {
        {
            let state = self.inner.state.lock();
            if !force && !state.new_users.is_empty() && state.total > 0 {
                return Ok(());
            }
        }

        self.begin();
        match self.inner.api.new_users().await {
            Ok(response) => {
                let mut state = self.inner.state.lock();
                state.new_users = response.new_users.into_iter().map(|u| u.email).collect();
                state.total = response.total;
                state.loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err, NEW_USERS_FALLBACK);
                self.finish();
                Err(err)
            }
        }
    }

    /// Refresh the mean age. Skipped when not forced and already non-zero.
    #[instrument(name = "users_client.store.fetch_average_age", skip(self))]
    pub async fn fetch_average_age(&self, force: bool) -> Result<(), ClientError> {
        {
            let state = self.inner.state.lock();
            if !force && state.average_age > 0 {
                return Ok(());
            }
        }

        self.begin();
        match self.inner.api.average_age().await {
            Ok(response) => {
                let mut state = self.inner.state.lock();
                state.average_age = response.average_age;
                state.loading = false;
                Ok(())
            }
            Err(err) => {
                self.fail(&err, AVERAGE_AGE_FALLBACK);
                self.finish();
                Err(err)
            }
        }
    }

    /// Invalidate the cache and re-run the three fetches concurrently.
    /// Each failure is isolated: logged, reflected in `error` by the action
    /// itself, and never propagated out of here.
    #[instrument(name = "users_client.store.refresh_all", skip(self))]
    pub async fn refresh_all(&self) {
        self.invalidate_cache();

        let (list, recent, age) = tokio::join!(
            self.fetch(true),
            self.fetch_new_users(true),
            self.fetch_average_age(true),
        );

        for (action, result) in [
            ("fetch", list),
            ("fetch_new_users", recent),
            ("fetch_average_age", age),
        ] {
            if let Err(err) = result {
                warn!(action, error = %err, "refresh_all sub-fetch failed");
            }
        }
    }

    // ----- internals -----

    fn cache_valid(&self, state: &StoreState) -> bool {
        state
            .last_fetch
            .map(|at| at.elapsed() < self.inner.cache_ttl)
            .unwrap_or(false)
    }

    fn begin(&self) {
        let mut state = self.inner.state.lock();
        state.loading = true;
        state.error = None;
    }

    fn finish(&self) {
        self.inner.state.lock().loading = false;
    }

    /// Record a failure message, preferring the server's own wording, and
    /// schedule the auto-clear. The clear only fires if the error still
    /// equals the message set here, so a newer error is never clobbered.
    fn fail(&self, err: &ClientError, fallback: &str) {
        let message = err
            .server_message()
            .map(str::to_owned)
            .unwrap_or_else(|| fallback.to_string());

        self.inner.state.lock().error = Some(message.clone());

        let store = self.clone();
        let ttl = self.inner.error_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = store.inner.state.lock();
            if state.error.as_deref() == Some(message.as_str()) {
                state.error = None;
            }
        });
    }
}

fn apply_patch(user: &mut User, patch: &UserPatch) {
    if let Some(name) = &patch.name {
        user.name = name.clone();
    }
    if let Some(email) = &patch.email {
        user.email = email.clone();
    }
    if let Some(password) = &patch.password {
        user.password = password.clone();
    }
    if let Some(cpf) = &patch.cpf {
        user.cpf = cpf.clone();
    }
    if let Some(birth_date) = patch.birth_date {
        user.birth_date = birth_date;
    }
    if let Some(avatar) = &patch.avatar {
        user.avatar = Some(avatar.clone());
    }
}
