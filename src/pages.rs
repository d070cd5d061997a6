use crossbeam_channel::{Receiver, Sender, TryRecvError};
use pdfium_render::prelude::*;
use std::thread;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("PDF engine unavailable: {0}")]
    Engine(String),
    #[error("Error loading PDF: {0}")]
    Load(String),
    #[error("Error rendering page: page {page} is out of range (document has {count})")]
    PageOutOfRange { page: u32, count: u32 },
    #[error("Error rendering page: {0}")]
    Render(String),
    #[error("Error rendering page: no document loaded")]
    NoDocument,
    #[error("page renderer stopped")]
    WorkerGone,
}

/// A rasterized page. Pixel size is `scale` times the page's size in points.
#[derive(Clone, Debug)]
pub struct RenderedPage {
    pub image: image::RgbaImage,
    pub scale: f32,
}

impl RenderedPage {
    pub fn pixel_size(&self) -> [usize; 2] {
        [self.image.width() as usize, self.image.height() as usize]
    }

    /// Page size in document (unscaled) units.
    pub fn document_size(&self) -> (f32, f32) {
        (
            self.image.width() as f32 / self.scale,
            self.image.height() as f32 / self.scale,
        )
    }
}

/// The document engine behind the canvas.
pub trait PageRasterizer {
    /// Replaces the current document and returns its page count.
    fn load(&mut self, bytes: Vec<u8>) -> Result<u32, RenderError>;
    /// Renders a 1-based page at the given zoom scale.
    fn rasterize(&mut self, page: u32, scale: f32) -> Result<RenderedPage, RenderError>;
}

pub struct PdfiumRasterizer {
    pdfium: Pdfium,
    bytes: Option<Vec<u8>>,
    page_count: u32,
}

impl PdfiumRasterizer {
    /// Binds pdfium from `dir` (or next to the executable) and falls back to the
    /// system library.
    pub fn bind(dir: Option<&str>) -> Result<Self, RenderError> {
        let dir = dir.unwrap_or("./").to_string();
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| RenderError::Engine(e.to_string()))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
            bytes: None,
            page_count: 0,
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn load(&mut self, bytes: Vec<u8>) -> Result<u32, RenderError> {
        let count = {
            let doc = self
                .pdfium
                .load_pdf_from_byte_slice(&bytes, None)
                .map_err(|e| RenderError::Load(e.to_string()))?;
            doc.pages().len() as u32
        };
        self.bytes = Some(bytes);
        self.page_count = count;
        Ok(count)
    }

    fn rasterize(&mut self, page: u32, scale: f32) -> Result<RenderedPage, RenderError> {
        let Some(bytes) = self.bytes.as_deref() else {
            return Err(RenderError::NoDocument);
        };
        if page == 0 || page > self.page_count {
            return Err(RenderError::PageOutOfRange {
                page,
                count: self.page_count,
            });
        }
        let doc = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| RenderError::Load(e.to_string()))?;
        let pdf_page = doc
            .pages()
            .get((page - 1) as PdfPageIndex)
            .map_err(|e| RenderError::Render(e.to_string()))?;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| RenderError::Render(e.to_string()))?;
        let width = bitmap.width() as u32;
        let height = bitmap.height() as u32;
        let image = image::RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .ok_or_else(|| RenderError::Render("bitmap size mismatch".to_string()))?;
        Ok(RenderedPage { image, scale })
    }
}

/// What a render was issued for. A completion is only shown while its ticket is
/// still the newest one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderTicket {
    pub generation: u64,
    pub page: u32,
    pub scale: f32,
}

#[derive(Debug, Default)]
pub struct RenderTracker {
    generation: u64,
    latest: Option<RenderTicket>,
}

impl RenderTracker {
    /// A new document invalidates everything issued so far.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.latest = None;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn issue(&mut self, page: u32, scale: f32) -> RenderTicket {
        let ticket = RenderTicket {
            generation: self.generation,
            page,
            scale,
        };
        self.latest = Some(ticket);
        ticket
    }

    pub fn is_current(&self, ticket: &RenderTicket) -> bool {
        self.latest.as_ref() == Some(ticket)
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }

    /// Marks the newest ticket as settled. Returns false for stale tickets.
    pub fn settle(&mut self, ticket: &RenderTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.latest = None;
        true
    }
}

enum Job {
    Load { generation: u64, bytes: Vec<u8> },
    Render(RenderTicket),
}

pub enum PageEvent {
    Loaded {
        generation: u64,
        result: Result<u32, RenderError>,
    },
    Rendered {
        ticket: RenderTicket,
        result: Result<RenderedPage, RenderError>,
    },
}

pub type RasterizerFactory =
    Box<dyn FnOnce() -> Result<Box<dyn PageRasterizer>, RenderError> + Send>;

/// Owns the worker thread that talks to the rasterizer.
pub struct PageService {
    jobs: Sender<Job>,
    events: Receiver<PageEvent>,
}

impl PageService {
    pub fn spawn(factory: RasterizerFactory, notify: Box<dyn Fn() + Send>) -> Self {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (event_tx, event_rx) = crossbeam_channel::unbounded::<PageEvent>();
        let spawned = thread::Builder::new()
            .name("page-renderer".to_string())
            .spawn(move || run_worker(factory, job_rx, event_tx, notify));
        if let Err(e) = spawned {
            log::error!("could not start page renderer: {e}");
        }
        Self {
            jobs: job_tx,
            events: event_rx,
        }
    }

    pub fn load(&self, generation: u64, bytes: Vec<u8>) -> Result<(), RenderError> {
        self.jobs
            .send(Job::Load { generation, bytes })
            .map_err(|_| RenderError::WorkerGone)
    }

    pub fn render(&self, ticket: RenderTicket) -> Result<(), RenderError> {
        self.jobs
            .send(Job::Render(ticket))
            .map_err(|_| RenderError::WorkerGone)
    }

    pub fn poll(&self) -> Vec<PageEvent> {
        let mut out = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(ev) => out.push(ev),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: std::time::Duration) -> Option<PageEvent> {
        self.events.recv_timeout(timeout).ok()
    }
}

fn run_worker(
    factory: RasterizerFactory,
    jobs: Receiver<Job>,
    events: Sender<PageEvent>,
    notify: Box<dyn Fn() + Send>,
) {
    let mut rasterizer = match factory() {
        Ok(r) => Some(r),
        Err(e) => {
            log::error!("{e}");
            None
        }
    };
    let engine_error = RenderError::Engine("PDF engine could not be initialised".to_string());

    while let Ok(first) = jobs.recv() {
        // Only the newest queued render matters; loads are always kept.
        let mut batch = vec![first];
        batch.extend(jobs.try_iter());
        let last_render = batch
            .iter()
            .rposition(|j| matches!(j, Job::Render(_)));

        for (idx, job) in batch.into_iter().enumerate() {
            let event = match job {
                Job::Load { generation, bytes } => {
                    let result = match rasterizer.as_mut() {
                        Some(r) => r.load(bytes),
                        None => Err(engine_error.clone()),
                    };
                    PageEvent::Loaded { generation, result }
                }
                Job::Render(ticket) => {
                    if Some(idx) != last_render {
                        log::trace!("skipping superseded render {ticket:?}");
                        continue;
                    }
                    let result = match rasterizer.as_mut() {
                        Some(r) => r.rasterize(ticket.page, ticket.scale),
                        None => Err(engine_error.clone()),
                    };
                    PageEvent::Rendered { ticket, result }
                }
            };
            if events.send(event).is_err() {
                return;
            }
            notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct FakeRasterizer {
        pages: u32,
        loaded: bool,
    }

    impl PageRasterizer for FakeRasterizer {
        fn load(&mut self, bytes: Vec<u8>) -> Result<u32, RenderError> {
            if !bytes.starts_with(b"%PDF") {
                return Err(RenderError::Load("Invalid PDF structure".to_string()));
            }
            self.loaded = true;
            Ok(self.pages)
        }

        fn rasterize(&mut self, page: u32, scale: f32) -> Result<RenderedPage, RenderError> {
            if !self.loaded {
                return Err(RenderError::NoDocument);
            }
            if page == 0 || page > self.pages {
                return Err(RenderError::PageOutOfRange {
                    page,
                    count: self.pages,
                });
            }
            let w = (100.0 * scale) as u32;
            let h = (200.0 * scale) as u32;
            Ok(RenderedPage {
                image: image::RgbaImage::new(w, h),
                scale,
            })
        }
    }

    fn fake_service(pages: u32) -> PageService {
        PageService::spawn(
            Box::new(move || -> Result<Box<dyn PageRasterizer>, RenderError> {
                Ok(Box::new(FakeRasterizer {
                    pages,
                    loaded: false,
                }))
            }),
            Box::new(|| {}),
        )
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn tracker_accepts_only_latest_ticket() {
        let mut tracker = RenderTracker::default();
        let generation = tracker.next_generation();
        let first = tracker.issue(1, 1.0);
        let second = tracker.issue(2, 1.0);
        assert_eq!(second.generation, generation);
        assert!(!tracker.is_current(&first));
        assert!(!tracker.settle(&first));
        assert!(tracker.is_pending());
        assert!(tracker.settle(&second));
        assert!(!tracker.is_pending());
    }

    #[test]
    fn tracker_rejects_same_page_at_old_scale() {
        let mut tracker = RenderTracker::default();
        tracker.next_generation();
        let old = tracker.issue(1, 1.0);
        let new = tracker.issue(1, 1.1);
        assert!(!tracker.is_current(&old));
        assert!(tracker.is_current(&new));
    }

    #[test]
    fn new_generation_invalidates_outstanding_renders() {
        let mut tracker = RenderTracker::default();
        tracker.next_generation();
        let ticket = tracker.issue(3, 1.0);
        tracker.next_generation();
        assert!(!tracker.is_current(&ticket));
        assert!(!tracker.is_pending());
    }

    #[test]
    fn rendered_page_reports_document_size() {
        let page = RenderedPage {
            image: image::RgbaImage::new(306, 396),
            scale: 0.5,
        };
        assert_eq!(page.pixel_size(), [306, 396]);
        assert_eq!(page.document_size(), (612.0, 792.0));
    }

    #[test]
    fn worker_loads_and_renders() {
        let service = fake_service(4);
        service.load(1, b"%PDF-1.7".to_vec()).unwrap();
        match service.recv_timeout(WAIT) {
            Some(PageEvent::Loaded { generation, result }) => {
                assert_eq!(generation, 1);
                assert_eq!(result, Ok(4));
            }
            _ => panic!("expected load completion"),
        }

        let ticket = RenderTicket {
            generation: 1,
            page: 2,
            scale: 1.5,
        };
        service.render(ticket).unwrap();
        match service.recv_timeout(WAIT) {
            Some(PageEvent::Rendered { ticket: t, result }) => {
                assert_eq!(t, ticket);
                let page = result.unwrap();
                assert_eq!(page.pixel_size(), [150, 300]);
            }
            _ => panic!("expected render completion"),
        }
    }

    #[test]
    fn worker_reports_errors_as_values() {
        let service = fake_service(2);
        service.load(1, b"not a pdf".to_vec()).unwrap();
        match service.recv_timeout(WAIT) {
            Some(PageEvent::Loaded { result, .. }) => {
                let err = result.unwrap_err();
                assert_eq!(err.to_string(), "Error loading PDF: Invalid PDF structure");
            }
            _ => panic!("expected load completion"),
        }

        service.load(2, b"%PDF-1.4".to_vec()).unwrap();
        let _ = service.recv_timeout(WAIT);
        service
            .render(RenderTicket {
                generation: 2,
                page: 9,
                scale: 1.0,
            })
            .unwrap();
        match service.recv_timeout(WAIT) {
            Some(PageEvent::Rendered { result, .. }) => {
                assert_eq!(
                    result.unwrap_err(),
                    RenderError::PageOutOfRange { page: 9, count: 2 }
                );
            }
            _ => panic!("expected render completion"),
        }
    }

    #[test]
    fn worker_without_engine_still_answers() {
        let service = PageService::spawn(
            Box::new(|| -> Result<Box<dyn PageRasterizer>, RenderError> {
                Err(RenderError::Engine("missing library".to_string()))
            }),
            Box::new(|| {}),
        );
        service.load(1, b"%PDF".to_vec()).unwrap();
        match service.recv_timeout(WAIT) {
            Some(PageEvent::Loaded { result, .. }) => {
                assert!(matches!(result, Err(RenderError::Engine(_))));
            }
            _ => panic!("expected load completion"),
        }
    }

    /// Blocks inside `load` until the gate opens and reports each rasterized page.
    struct GatedRasterizer {
        entered: Sender<()>,
        gate: Receiver<()>,
        rasterized: Sender<u32>,
    }

    impl PageRasterizer for GatedRasterizer {
        fn load(&mut self, _bytes: Vec<u8>) -> Result<u32, RenderError> {
            let _ = self.entered.send(());
            let _ = self.gate.recv();
            Ok(10)
        }

        fn rasterize(&mut self, page: u32, scale: f32) -> Result<RenderedPage, RenderError> {
            let _ = self.rasterized.send(page);
            Ok(RenderedPage {
                image: image::RgbaImage::new(4, 4),
                scale,
            })
        }
    }

    #[test]
    fn worker_renders_only_newest_queued_ticket() {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded::<()>();
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded::<()>();
        let (pages_tx, pages_rx) = crossbeam_channel::unbounded::<u32>();
        let service = PageService::spawn(
            Box::new(move || -> Result<Box<dyn PageRasterizer>, RenderError> {
                Ok(Box::new(GatedRasterizer {
                    entered: entered_tx,
                    gate: gate_rx,
                    rasterized: pages_tx,
                }))
            }),
            Box::new(|| {}),
        );

        service.load(1, b"%PDF".to_vec()).unwrap();
        // The worker is now busy, so every render below lands in one queue.
        entered_rx.recv_timeout(WAIT).unwrap();
        let tickets: Vec<RenderTicket> = (1..=3)
            .map(|page| RenderTicket {
                generation: 1,
                page,
                scale: 1.0 + page as f32 / 10.0,
            })
            .collect();
        for ticket in &tickets {
            service.render(*ticket).unwrap();
        }
        gate_tx.send(()).unwrap();

        match service.recv_timeout(WAIT) {
            Some(PageEvent::Loaded { result, .. }) => assert_eq!(result, Ok(10)),
            _ => panic!("expected load completion"),
        }
        match service.recv_timeout(WAIT) {
            Some(PageEvent::Rendered { ticket, result }) => {
                assert_eq!(ticket, tickets[2]);
                assert!(result.is_ok());
            }
            _ => panic!("expected render completion"),
        }
        assert!(service.recv_timeout(Duration::from_millis(200)).is_none());
        assert_eq!(pages_rx.try_iter().collect::<Vec<_>>(), vec![3]);
    }
}
