use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextModel;
use crate::publish::{ObjectStore, RecordStore};

/// Everything a run needs, built once in `main` and passed to `pipeline::run`.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when `DISABLE_MODEL` is set; both steps then go straight to the local path.
    pub model: Option<Arc<dyn TextModel>>,
    pub objects: Arc<dyn ObjectStore>,
    pub records: Arc<dyn RecordStore>,
}
