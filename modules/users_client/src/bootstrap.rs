use tracing::{debug, instrument, warn};

use crate::store::UserStore;

/// Populate the store once at application start.
///
/// No-op when the list already has data or a load is in progress, so
/// repeated invocations (e.g. from re-running app setup) never stack
/// concurrent bootstraps. The three fetches run concurrently and fail
/// independently: a dead `/users/new` endpoint must not block the list.
#[instrument(name = "users_client.bootstrap", skip(store))]
pub async fn initialize(store: &UserStore) {
    if store.has_data() || store.is_loading() {
        debug!("store already populated or loading, skipping bootstrap");
        return;
    }

    let (list, recent, age) = tokio::join!(
        store.fetch(false),
        store.fetch_new_users(false),
        store.fetch_average_age(false),
    );

    for (action, result) in [
        ("fetch", list),
        ("fetch_new_users", recent),
        ("fetch_average_age", age),
    ] {
        if let Err(err) = result {
            warn!(action, error = %err, "bootstrap sub-fetch failed");
        }
    }
}
