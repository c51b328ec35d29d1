use std::sync::Arc;

use service::admin_auth::AdminAuth;
use service::runtime::Collections;

/// Everything the handlers need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub collections: Collections,
    pub admin_auth: Arc<AdminAuth>,
    /// Include error details in 500 bodies (development mode).
    pub expose_error_details: bool,
    pub static_dir: Option<String>,
}
