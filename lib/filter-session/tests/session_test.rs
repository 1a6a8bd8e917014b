use anyhow::Result;
use async_trait::async_trait;
use filter_session::{
    FilterEngine, FilterInputs, FilterKind, FilterSession, ImageSource, LoadOutcome,
    MemoryUsageStore, ReviewPrompt, SessionError, SessionResult, ShareHandle, SharePreview,
    ShareSink, Slot, UsageStore,
};
use image::{ImageFormat, Rgba, RgbaImage};
use std::{
    collections::HashMap,
    io::Cursor,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 90, 255]))
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

/// Serves canned bytes per selection name, optionally after a delay.
#[derive(Default)]
struct FakeSource {
    files: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
}

impl FakeSource {
    fn with_file(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(name.to_string(), bytes);
        self
    }

    fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }
}

#[async_trait]
impl ImageSource for FakeSource {
    async fn fetch(&self, selection: &str) -> Option<Vec<u8>> {
        if let Some(delay) = self.delays.get(selection) {
            tokio::time::sleep(*delay).await;
        }
        self.files.get(selection).cloned()
    }
}

/// Paints the whole output in a color derived from the filter and its inputs
/// and records every call.
#[derive(Clone, Default)]
struct FakeEngine {
    calls: Arc<Mutex<Vec<(FilterKind, FilterInputs)>>>,
    failing: Arc<AtomicBool>,
}

impl FilterEngine for FakeEngine {
    fn render(
        &self,
        kind: FilterKind,
        source: &RgbaImage,
        inputs: &FilterInputs,
    ) -> Option<RgbaImage> {
        self.calls.lock().unwrap().push((kind, *inputs));

        if self.failing.load(Ordering::SeqCst) {
            return None;
        }

        let color = Rgba([
            u8::from(kind) * 20,
            (inputs.intensity.unwrap_or(0.0) * 255.0) as u8,
            inputs.radius.unwrap_or(0.0) as u8,
            (inputs.scale.unwrap_or(0.0) * 25.0) as u8,
        ]);
        Some(RgbaImage::from_pixel(source.width(), source.height(), color))
    }
}

#[derive(Clone, Default)]
struct CountingPrompt(Arc<AtomicUsize>);

impl ReviewPrompt for CountingPrompt {
    fn request(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<(u32, u32, String)>>>);

impl ShareSink for RecordingSink {
    fn export(&mut self, image: &RgbaImage, preview: &SharePreview) -> SessionResult<ShareHandle> {
        let mut exports = self.0.lock().unwrap();
        exports.push((image.width(), image.height(), preview.title.clone()));
        Ok(ShareHandle {
            location: format!("memory://{}", exports.len()),
        })
    }
}

/// Store shared with the test so the flushed value can be inspected.
#[derive(Clone, Default)]
struct SharedStore(Arc<Mutex<MemoryUsageStore>>);

impl UsageStore for SharedStore {
    fn load(&mut self) -> u32 {
        self.0.lock().unwrap().load()
    }

    fn flush(&mut self, count: u32) -> SessionResult<()> {
        self.0.lock().unwrap().flush(count)
    }
}

struct BrokenStore;

impl UsageStore for BrokenStore {
    fn load(&mut self) -> u32 {
        0
    }

    fn flush(&mut self, _count: u32) -> SessionResult<()> {
        Err(SessionError::Storage("read-only".to_string()))
    }
}

fn source() -> FakeSource {
    FakeSource::default()
        .with_file("photo", png_bytes(100, 100))
        .with_file("other", png_bytes(30, 20))
        .with_file("garbage", b"definitely not a png".to_vec())
}

fn session(engine: &FakeEngine) -> FilterSession {
    FilterSession::new(Arc::new(source()), Box::new(engine.clone()))
}

#[tokio::test]
async fn select_valid_image_renders_with_default_filter() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);

    assert_eq!(session.active_filter(), FilterKind::SepiaTone);
    assert!(session.placeholder().is_some());
    assert!(!session.slot_enabled(Slot::Intensity));

    assert_eq!(session.select_image("photo").await, LoadOutcome::Applied);

    let rendered = session.rendered().expect("rendered output");
    assert_eq!(rendered.dimensions(), (100, 100));
    assert!(session.placeholder().is_none());
    assert!(session.slot_enabled(Slot::Intensity));

    let calls = engine.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, FilterKind::SepiaTone);
    assert_eq!(calls[0].1.intensity, Some(0.5));
    assert_eq!(calls[0].1.radius, None);
    assert_eq!(calls[0].1.scale, None);
}

#[tokio::test]
async fn failed_fetch_leaves_state_unchanged() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);

    assert_eq!(session.select_image("photo").await, LoadOutcome::Applied);
    let before = session.rendered().cloned();

    assert_eq!(session.select_image("missing").await, LoadOutcome::Empty);
    assert_eq!(session.select_image("garbage").await, LoadOutcome::Undecodable);

    assert_eq!(session.rendered().cloned(), before);
    assert_eq!(session.source_image().unwrap().dimensions(), (100, 100));
    assert_eq!(engine.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn new_selection_replaces_previous_output() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);

    session.select_image("photo").await;
    session.select_image("other").await;

    assert_eq!(session.source_image().unwrap().dimensions(), (30, 20));
    assert_eq!(session.rendered().unwrap().dimensions(), (30, 20));
}

#[tokio::test]
async fn new_selection_clears_output_when_render_fails() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);

    session.select_image("photo").await;
    assert!(session.rendered().is_some());

    engine.failing.store(true, Ordering::SeqCst);
    assert_eq!(session.select_image("other").await, LoadOutcome::Applied);
    assert!(session.rendered().is_none());
}

#[tokio::test]
async fn undeclared_slot_keeps_output_identical() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);
    session.select_image("photo").await;

    let before = session.rendered().cloned().unwrap();

    assert!(!session.set_parameter(Slot::Radius, 50.0));
    assert_eq!(session.rendered().unwrap().as_raw(), before.as_raw());
    assert_eq!(session.parameters().radius, 0.5);
}

#[tokio::test]
async fn undeclared_slot_never_alters_output_for_any_filter() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);
    session.select_image("photo").await;

    for kind in FilterKind::all_filters() {
        session.change_filter(*kind);

        for slot in Slot::ALL {
            if kind.accepts(slot) {
                continue;
            }

            let before = session.rendered().cloned();
            session.set_parameter(slot, 3.0);
            assert_eq!(session.rendered().cloned(), before, "{kind} {slot}");
        }
    }
}

#[tokio::test]
async fn declared_slot_is_clamped_and_rendered() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);
    session.select_image("photo").await;
    session.change_filter(FilterKind::GaussianBlur);

    assert!(session.set_parameter(Slot::Radius, 500.0));
    assert_eq!(session.parameters().radius, 200.0);

    let calls = engine.calls.lock().unwrap();
    let (kind, inputs) = calls.last().unwrap();
    assert_eq!(*kind, FilterKind::GaussianBlur);
    assert_eq!(inputs.radius, Some(200.0));
    assert_eq!(inputs.intensity, None);
}

#[tokio::test]
async fn parameter_before_image_is_stored_without_render() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);

    assert!(session.set_parameter(Slot::Intensity, 0.9));
    assert!(engine.calls.lock().unwrap().is_empty());
    assert!(session.rendered().is_none());

    session.select_image("photo").await;
    assert_eq!(engine.calls.lock().unwrap()[0].1.intensity, Some(0.9));
}

#[tokio::test]
async fn change_filter_rerenders_existing_source() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);
    session.select_image("photo").await;

    let before = session.rendered().cloned().unwrap();
    assert!(!session.slot_visible(Slot::Radius));
    assert!(!session.slot_enabled(Slot::Radius));

    session.change_filter(FilterKind::GaussianBlur);

    assert!(session.slot_enabled(Slot::Radius));
    assert!(!session.slot_visible(Slot::Intensity));
    assert_ne!(session.rendered().unwrap(), &before);
    assert_eq!(session.source_image().unwrap().dimensions(), (100, 100));
    assert_eq!(engine.calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn render_failure_keeps_last_good_output() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);
    session.select_image("photo").await;
    let before = session.rendered().cloned();

    engine.failing.store(true, Ordering::SeqCst);
    session.change_filter(FilterKind::Pixellate);
    assert!(session.set_parameter(Slot::Scale, 4.0));

    assert_eq!(session.rendered().cloned(), before);
    assert_eq!(session.active_filter(), FilterKind::Pixellate);
}

#[test]
fn change_filter_without_image_only_counts() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine);

    session.change_filter(FilterKind::Edges);

    assert_eq!(session.usage_count(), 1);
    assert!(session.rendered().is_none());
    assert!(engine.calls.lock().unwrap().is_empty());
}

#[test]
fn usage_count_increments_and_is_flushed() {
    init_logger();
    let store = SharedStore(Arc::new(Mutex::new(MemoryUsageStore::new(7))));
    let mut session = session(&FakeEngine::default()).with_usage_store(Box::new(store.clone()));

    assert_eq!(session.usage_count(), 7);

    for (i, kind) in FilterKind::all_filters().iter().enumerate() {
        session.change_filter(*kind);
        assert_eq!(session.usage_count(), 8 + i as u32);
    }

    let stored = store.0.lock().unwrap();
    assert_eq!(stored.count, 17);
    assert_eq!(stored.flushes, 10);
}

#[test]
fn review_requested_once_at_threshold() {
    init_logger();
    let prompt = CountingPrompt::default();
    let mut session = session(&FakeEngine::default())
        .with_usage_store(Box::new(MemoryUsageStore::new(18)))
        .with_review_prompt(Box::new(prompt.clone()));

    session.change_filter(FilterKind::Edges);
    assert_eq!(session.usage_count(), 19);
    assert_eq!(prompt.0.load(Ordering::SeqCst), 0);

    session.change_filter(FilterKind::Vignette);
    assert_eq!(session.usage_count(), 20);
    assert_eq!(prompt.0.load(Ordering::SeqCst), 1);

    for _ in 0..5 {
        session.change_filter(FilterKind::Kaleidoscope);
    }
    assert_eq!(session.usage_count(), 25);
    assert_eq!(prompt.0.load(Ordering::SeqCst), 1);
}

#[test]
fn review_not_requested_when_restored_past_threshold() {
    init_logger();
    let prompt = CountingPrompt::default();
    let mut session = session(&FakeEngine::default())
        .with_usage_store(Box::new(MemoryUsageStore::new(20)))
        .with_review_prompt(Box::new(prompt.clone()));

    session.change_filter(FilterKind::Edges);
    assert_eq!(session.usage_count(), 21);
    assert_eq!(prompt.0.load(Ordering::SeqCst), 0);
}

#[test]
fn storage_failure_does_not_block_filter_change() {
    init_logger();
    let engine = FakeEngine::default();
    let mut session = session(&engine).with_usage_store(Box::new(BrokenStore));

    session.change_filter(FilterKind::ComicEffect);

    assert_eq!(session.active_filter(), FilterKind::ComicEffect);
    assert_eq!(session.usage_count(), 1);
    assert!(session.flush().is_err());
}

#[tokio::test]
async fn share_only_with_rendered_output() -> Result<()> {
    init_logger();
    let sink = RecordingSink::default();
    let mut session = session(&FakeEngine::default()).with_share_sink(Box::new(sink.clone()));

    assert!(!session.can_share());
    assert!(matches!(session.share(), Err(SessionError::NothingToShare)));

    session.select_image("photo").await;
    assert!(session.can_share());

    let handle = session.share()?;
    assert_eq!(handle.location, "memory://1");

    let exports = sink.0.lock().unwrap();
    assert_eq!(exports.as_slice(), &[(100, 100, "Instafilter image".to_string())]);

    Ok(())
}

#[tokio::test]
async fn overlapping_selections_latest_wins() {
    init_logger();
    let engine = FakeEngine::default();
    let source = Arc::new(
        source()
            .with_file("slow", png_bytes(64, 64))
            .with_delay("slow", Duration::from_millis(50)),
    );
    let mut session = FilterSession::new(source.clone(), Box::new(engine.clone()));

    let slow_ticket = session.begin_selection();
    let slow = tokio::spawn({
        let source = source.clone();
        async move { source.fetch("slow").await }
    });

    let fast_ticket = session.begin_selection();
    let fast = source.fetch("other").await;
    assert_eq!(session.finish_selection(fast_ticket, fast), LoadOutcome::Applied);

    let slow = slow.await.expect("join fetch task");
    assert_eq!(session.finish_selection(slow_ticket, slow), LoadOutcome::Stale);

    assert_eq!(session.source_image().unwrap().dimensions(), (30, 20));
    assert_eq!(engine.calls.lock().unwrap().len(), 1);
}
