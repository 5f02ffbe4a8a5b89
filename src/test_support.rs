//! Helpers shared by unit tests.

use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Number of log events seen per level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub trace: usize,
    pub debug: usize,
    pub info: usize,
    pub warn: usize,
    pub error: usize,
}

struct CountingLayer(Arc<Mutex<LevelCounts>>);

impl<S: Subscriber> Layer<S> for CountingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut counts = self.0.lock().unwrap();
        match *event.metadata().level() {
            Level::ERROR => counts.error += 1,
            Level::WARN => counts.warn += 1,
            Level::INFO => counts.info += 1,
            Level::DEBUG => counts.debug += 1,
            Level::TRACE => counts.trace += 1,
        }
    }
}

/// Run `fut` with a subscriber that counts events per level on this thread
pub async fn capture_levels<F: Future>(fut: F) -> (F::Output, LevelCounts) {
    let counts = Arc::new(Mutex::new(LevelCounts::default()));
    let subscriber = tracing_subscriber::registry().with(CountingLayer(counts.clone()));

    let output = {
        let _guard = tracing::subscriber::set_default(subscriber);
        fut.await
    };

    let counts = *counts.lock().unwrap();
    (output, counts)
}
