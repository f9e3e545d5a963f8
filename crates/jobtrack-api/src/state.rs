//! Application state shared by all handlers.

use jobtrack_core::Config;
use jobtrack_storage::{RecordStore, TransferBroker};

/// Main application state, injected into handlers as `State<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: RecordStore,
    pub broker: TransferBroker,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
