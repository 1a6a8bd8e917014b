use crate::{
    FilterEngine, FilterKind, FilterParameters, ImageSource, LogReviewPrompt, MemoryUsageStore,
    ReviewPrompt, SessionError, SessionResult, ShareHandle, SharePreview, ShareSink, Slot,
    UsageStore,
};
use image::RgbaImage;
use log::{debug, warn};
use std::sync::Arc;

/// Filter changes after which feedback is requested.
pub const REVIEW_THRESHOLD: u32 = 20;

pub const SHARE_PREVIEW_TITLE: &str = "Instafilter image";

/// Identifies one image selection. Only the most recent ticket is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// New source stored and rendered
    Applied,
    /// The source returned no data
    Empty,
    /// The data was not a picture
    Undecodable,
    /// A newer selection was started meanwhile
    Stale,
}

/// Shown instead of the picture while nothing has been rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub title: &'static str,
    pub description: &'static str,
}

const NO_PICTURE: Placeholder = Placeholder {
    title: "No Picture",
    description: "Tap to import a photo",
};

pub struct FilterSession {
    source: Arc<dyn ImageSource>,
    engine: Box<dyn FilterEngine>,
    share_sink: Option<Box<dyn ShareSink>>,
    review_prompt: Box<dyn ReviewPrompt>,
    usage_store: Box<dyn UsageStore>,

    source_image: Option<RgbaImage>,
    active_filter: FilterKind,
    parameters: FilterParameters,
    rendered: Option<RgbaImage>,
    usage_count: u32,
    review_requested: bool,
    generation: u64,
}

impl FilterSession {
    pub fn new(source: Arc<dyn ImageSource>, engine: Box<dyn FilterEngine>) -> Self {
        Self {
            source,
            engine,
            share_sink: None,
            review_prompt: Box::new(LogReviewPrompt),
            usage_store: Box::new(MemoryUsageStore::default()),
            source_image: None,
            active_filter: FilterKind::default(),
            parameters: FilterParameters::default(),
            rendered: None,
            usage_count: 0,
            review_requested: false,
            generation: 0,
        }
    }

    pub fn with_share_sink(mut self, sink: Box<dyn ShareSink>) -> Self {
        self.share_sink = Some(sink);
        self
    }

    pub fn with_review_prompt(mut self, prompt: Box<dyn ReviewPrompt>) -> Self {
        self.review_prompt = prompt;
        self
    }

    /// Replaces the counter store and takes its persisted value.
    pub fn with_usage_store(mut self, mut store: Box<dyn UsageStore>) -> Self {
        self.usage_count = store.load();
        self.usage_store = store;
        debug!("usage count loaded: {}", self.usage_count);
        self
    }

    pub fn image_source(&self) -> Arc<dyn ImageSource> {
        self.source.clone()
    }

    pub fn active_filter(&self) -> FilterKind {
        self.active_filter
    }

    pub fn parameters(&self) -> &FilterParameters {
        &self.parameters
    }

    pub fn source_image(&self) -> Option<&RgbaImage> {
        self.source_image.as_ref()
    }

    pub fn rendered(&self) -> Option<&RgbaImage> {
        self.rendered.as_ref()
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    /// Fetches `selection` and makes it the new source.
    pub async fn select_image(&mut self, selection: &str) -> LoadOutcome {
        let ticket = self.begin_selection();
        let source = self.source.clone();
        let bytes = source.fetch(selection).await;
        self.finish_selection(ticket, bytes)
    }

    /// Starts a selection whose fetch the caller runs itself. Any ticket
    /// handed out earlier becomes stale.
    pub fn begin_selection(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Completes the selection identified by `ticket` with the fetched bytes.
    /// Anything but a decodable picture for the latest ticket leaves the
    /// session untouched.
    pub fn finish_selection(&mut self, ticket: LoadTicket, bytes: Option<Vec<u8>>) -> LoadOutcome {
        if ticket.0 != self.generation {
            debug!("drop stale selection {} (latest {})", ticket.0, self.generation);
            return LoadOutcome::Stale;
        }

        let bytes = match bytes {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => {
                debug!("selection {} returned no data", ticket.0);
                return LoadOutcome::Empty;
            }
        };

        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image.to_rgba8(),
            Err(e) => {
                debug!("selection {} is not a picture: {e}", ticket.0);
                return LoadOutcome::Undecodable;
            }
        };

        if image.width() == 0 || image.height() == 0 {
            return LoadOutcome::Undecodable;
        }

        debug!(
            "selection {} loaded: {}x{}",
            ticket.0,
            image.width(),
            image.height()
        );

        self.source_image = Some(image);
        self.rendered = None;
        self.render();

        LoadOutcome::Applied
    }

    /// Stores `value`, clamped to the slot range, when the active filter reads
    /// `slot`, then re-renders. Returns whether the value was taken.
    pub fn set_parameter(&mut self, slot: Slot, value: f32) -> bool {
        if value.is_nan() {
            return false;
        }

        if !self.active_filter.accepts(slot) {
            debug!("{} ignores {slot}", self.active_filter);
            return false;
        }

        self.parameters.set(slot, slot.clamp(value));
        self.render();
        true
    }

    /// Switches filter, re-renders the current source and counts the change.
    pub fn change_filter(&mut self, kind: FilterKind) {
        self.active_filter = kind;
        self.render();

        self.usage_count = self.usage_count.saturating_add(1);
        if let Err(e) = self.usage_store.flush(self.usage_count) {
            warn!("save usage count failed: {e}");
        }

        if self.usage_count == REVIEW_THRESHOLD && !self.review_requested {
            self.review_requested = true;
            self.review_prompt.request();
        }
    }

    /// Writes the counter to the store.
    pub fn flush(&mut self) -> SessionResult<()> {
        self.usage_store.flush(self.usage_count)
    }

    pub fn share(&mut self) -> SessionResult<ShareHandle> {
        let image = self.rendered.as_ref().ok_or(SessionError::NothingToShare)?;
        let sink = self.share_sink.as_mut().ok_or(SessionError::NoShareSink)?;

        let preview = SharePreview {
            title: SHARE_PREVIEW_TITLE.to_string(),
        };
        sink.export(image, &preview)
    }

    pub fn can_share(&self) -> bool {
        self.rendered.is_some() && self.share_sink.is_some()
    }

    pub fn can_change_filter(&self) -> bool {
        self.rendered.is_some()
    }

    /// Whether the slider for `slot` is shown at all.
    pub fn slot_visible(&self, slot: Slot) -> bool {
        self.active_filter.accepts(slot)
    }

    /// Whether the slider for `slot` can be moved.
    pub fn slot_enabled(&self, slot: Slot) -> bool {
        self.slot_visible(slot) && self.rendered.is_some()
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        self.rendered.is_none().then_some(NO_PICTURE)
    }

    fn render(&mut self) {
        let Some(source) = self.source_image.as_ref() else {
            return;
        };

        let inputs = self.parameters.inputs_for(self.active_filter);
        match self.engine.render(self.active_filter, source, &inputs) {
            Some(output) if output.width() > 0 && output.height() > 0 => {
                self.rendered = Some(output);
            }
            _ => warn!(
                "render {} with {:?} failed, keep last output",
                self.active_filter,
                inputs.named()
            ),
        }
    }
}
