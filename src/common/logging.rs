use super::config::Settings;
use std::str::FromStr;
use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    filter::filter_fn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Install the fmt subscriber for the crate targets. Unknown levels fall back
/// on `INFO`. Does nothing if a global subscriber is already set.
pub fn init(settings: &Settings) {
    let level = LevelFilter::from_str(&settings.log_level).unwrap_or(LevelFilter::INFO);
    let layer = tracing_subscriber::fmt::layer()
        .with_filter(filter_fn(|metadata| {
            metadata.target().starts_with("hook_sync")
        }))
        .with_filter(level);
    let _ = tracing_subscriber::registry().with(layer).try_init();
}
