//! API shared state

use std::sync::Arc;

use crate::collector::Collector;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    pub collector: Arc<Collector>,
}

impl ApiState {
    pub fn new(collector: Arc<Collector>) -> Self {
        Self { collector }
    }
}
