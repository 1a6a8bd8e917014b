//! Seams between the session and the host: where images come from, who
//! renders them, where finished pictures go, and where the usage counter lives.

use crate::{FilterInputs, FilterKind, SessionResult};
use async_trait::async_trait;
use image::RgbaImage;

/// Produces the raw bytes of a picture the user picked. Failures are
/// reported as `None` and never carry a reason.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, selection: &str) -> Option<Vec<u8>>;
}

/// Renders `source` through `kind`. Returns `None` when no output could be
/// produced.
pub trait FilterEngine: Send {
    fn render(&self, kind: FilterKind, source: &RgbaImage, inputs: &FilterInputs)
    -> Option<RgbaImage>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePreview {
    pub title: String,
}

/// Where an exported picture ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareHandle {
    pub location: String,
}

pub trait ShareSink: Send {
    fn export(&mut self, image: &RgbaImage, preview: &SharePreview) -> SessionResult<ShareHandle>;
}

/// Fire-and-forget request for user feedback.
pub trait ReviewPrompt: Send {
    fn request(&mut self);
}

/// Durable home of the usage counter.
pub trait UsageStore: Send {
    fn load(&mut self) -> u32;
    fn flush(&mut self, count: u32) -> SessionResult<()>;
}

/// Keeps the counter in memory only. Used when the host has no storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryUsageStore {
    pub count: u32,
    pub flushes: usize,
}

impl MemoryUsageStore {
    pub fn new(count: u32) -> Self {
        Self { count, flushes: 0 }
    }
}

impl UsageStore for MemoryUsageStore {
    fn load(&mut self) -> u32 {
        self.count
    }

    fn flush(&mut self, count: u32) -> SessionResult<()> {
        self.count = count;
        self.flushes += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogReviewPrompt;

impl ReviewPrompt for LogReviewPrompt {
    fn request(&mut self) {
        log::info!("feedback requested");
    }
}
