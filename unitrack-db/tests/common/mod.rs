#![allow(dead_code)]

use unitrack_core::{NewProfile, Role};
use unitrack_db::Store;
use uuid::Uuid;

/// Route store logs to the test harness; `RUST_LOG=unitrack_db=debug` to see them.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .compact()
        .try_init();
}

pub async fn store() -> Store {
    init_logging();
    Store::open_in_memory().await.expect("in-memory store")
}

pub async fn profile(store: &Store, role: Role) -> Uuid {
    let id = Uuid::new_v4();
    store
        .profiles()
        .create(&NewProfile::new(id, role))
        .await
        .expect("create profile");
    id
}
