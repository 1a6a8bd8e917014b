//! Concrete collaborators of the filter session and the ways to drive it.

pub mod batch;
pub mod engine;
pub mod review;
pub mod session_loop;
pub mod share;
pub mod source;
pub mod usage;

use crate::config::Config;
use filter_session::{FilterSession, ShareSink};
use std::{io::Write, sync::Arc};

/// Wires a session to the file system, the effect library and the config
/// file holding the usage counter.
pub fn build_session(config: &Config) -> FilterSession {
    session_with(
        config,
        Box::new(share::FileShareSink::directory(
            config.share_dir(),
            config.share.open_after_share,
        )),
        std::io::stdout(),
    )
}

/// Same wiring as [`build_session`] with another share target and the review
/// request written to `prompt_output`.
pub fn session_with<W: Write + Send + 'static>(
    config: &Config,
    share_sink: Box<dyn ShareSink>,
    prompt_output: W,
) -> FilterSession {
    FilterSession::new(
        Arc::new(source::FileImageSource),
        Box::new(engine::EffectEngine),
    )
    .with_share_sink(share_sink)
    .with_review_prompt(Box::new(review::ConsoleReviewPrompt::with_output(
        &config.review.url,
        prompt_output,
    )))
    .with_usage_store(Box::new(usage::ConfigUsageStore::new(config.clone())))
}
