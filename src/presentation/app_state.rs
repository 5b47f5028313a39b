// Application state for HTTP handlers
use crate::application::feed_runtime::FeedRuntime;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<FeedRuntime>,
}
