//! Application state shared by all handlers.

use std::sync::Arc;

use medley_core::Config;
use medley_db::{MediaRepository, TagRepository, UserRepository};
use medley_storage::Storage;
use sqlx::PgPool;

use crate::auth::jwt::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub users: UserRepository,
    pub tags: TagRepository,
    pub media: MediaRepository,
    pub storage: Arc<dyn Storage>,
    pub jwt: Arc<JwtService>,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
