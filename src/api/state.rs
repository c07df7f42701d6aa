use std::sync::Arc;

use crate::calculate::ReportOptions;
use crate::config::AnalyticsConfig;
use crate::fetch::CachedSource;

#[derive(Clone)]
pub struct AppState {
    pub source: CachedSource,
    pub analytics: Arc<AnalyticsConfig>,
    pub cors_origin: Arc<str>,
}

impl AppState {
    pub fn new(source: CachedSource, analytics: AnalyticsConfig) -> Self {
        Self {
            source,
            analytics: Arc::new(analytics),
            cors_origin: Arc::from("*"),
        }
    }

    pub fn with_cors_origin(mut self, origin: &str) -> Self {
        self.cors_origin = Arc::from(origin);
        self
    }

    /// Report options with per-request overrides applied.
    pub fn report_options(&self, window: Option<usize>, limit: Option<usize>) -> ReportOptions {
        let defaults = self.analytics.report_options();
        ReportOptions {
            window_size: window.unwrap_or(defaults.window_size),
            top_limit: limit.unwrap_or(defaults.top_limit),
        }
    }
}
