//! Read-only preview rendering with supersede-and-discard cancellation.
//!
//! A new page or zoom request aborts the in-flight render task and bumps a
//! generation counter. A render that still completes publishes its frame only
//! if its generation is current, so a stale result can never overwrite a newer
//! one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::export::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub page_index: usize,
    pub zoom_percent: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFrame {
    pub request: PreviewRequest,
    pub width_px: u32,
    pub height_px: u32,
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PreviewState {
    #[default]
    Idle,
    Ready(PreviewFrame),
    Failed {
        request: PreviewRequest,
        message: String,
    },
}

/// External renderer for one page of the finished document.
#[async_trait]
pub trait PageRasterizer: Send + Sync + 'static {
    async fn render(&self, request: PreviewRequest) -> Result<PreviewFrame, ExportError>;
}

pub struct PreviewScheduler<R: PageRasterizer> {
    rasterizer: Arc<R>,
    generation: Arc<AtomicU64>,
    in_flight: Option<JoinHandle<()>>,
    state: Arc<watch::Sender<PreviewState>>,
}

impl<R: PageRasterizer> PreviewScheduler<R> {
    pub fn new(rasterizer: Arc<R>) -> Self {
        let (state, _) = watch::channel(PreviewState::Idle);
        Self {
            rasterizer,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: None,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> PreviewState {
        self.state.borrow().clone()
    }

    /// Supersedes any in-flight render with `request`. Must be called from
    /// within a tokio runtime.
    pub fn request(&mut self, request: PreviewRequest) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let rasterizer = Arc::clone(&self.rasterizer);
        let current = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);

        self.in_flight = Some(tokio::spawn(async move {
            let result = rasterizer.render(request).await;
            if current.load(Ordering::SeqCst) != generation {
                debug!(generation, "discarding stale preview render");
                return;
            }
            let next = match result {
                Ok(frame) => PreviewState::Ready(frame),
                Err(err) => {
                    warn!(error = %err, page = request.page_index, "preview render failed");
                    PreviewState::Failed {
                        request,
                        message: err.to_string(),
                    }
                }
            };
            state.send_replace(next);
        }));
    }
}

impl<R: PageRasterizer> Drop for PreviewScheduler<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeRasterizer {
        finished: Mutex<Vec<PreviewRequest>>,
    }

    #[async_trait]
    impl PageRasterizer for FakeRasterizer {
        async fn render(&self, request: PreviewRequest) -> Result<PreviewFrame, ExportError> {
            let delay = if request.page_index == 0 { 100 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if request.zoom_percent == 0 {
                return Err(ExportError::Rasterize("zero zoom".to_string()));
            }
            self.finished.lock().unwrap().push(request);
            Ok(PreviewFrame {
                request,
                width_px: 794 * u32::from(request.zoom_percent) / 100,
                height_px: 1123 * u32::from(request.zoom_percent) / 100,
                image: vec![],
            })
        }
    }

    fn req(page_index: usize, zoom_percent: u16) -> PreviewRequest {
        PreviewRequest {
            page_index,
            zoom_percent,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_request_supersedes_in_flight_render() {
        let rasterizer = Arc::new(FakeRasterizer::default());
        let mut scheduler = PreviewScheduler::new(Arc::clone(&rasterizer));
        let mut rx = scheduler.subscribe();

        scheduler.request(req(0, 100));
        tokio::task::yield_now().await;
        scheduler.request(req(1, 150));

        rx.changed().await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        match scheduler.current() {
            PreviewState::Ready(frame) => {
                assert_eq!(frame.request, req(1, 150));
                assert_eq!(frame.width_px, 1191);
            }
            other => panic!("unexpected state {other:?}"),
        }
        assert_eq!(*rasterizer.finished.lock().unwrap(), vec![req(1, 150)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_render_reports_message() {
        let rasterizer = Arc::new(FakeRasterizer::default());
        let mut scheduler = PreviewScheduler::new(rasterizer);
        let mut rx = scheduler.subscribe();

        scheduler.request(req(1, 0));
        rx.changed().await.unwrap();

        assert_eq!(
            scheduler.current(),
            PreviewState::Failed {
                request: req(1, 0),
                message: "rasterization failed: zero zoom".to_string(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_until_first_request() {
        let scheduler = PreviewScheduler::new(Arc::new(FakeRasterizer::default()));
        assert_eq!(scheduler.current(), PreviewState::Idle);
    }
}
