//! Export Pipeline: produces a print-ready view of the current markdown preview.
//!
//! Protocol:
//! 1. Render the preview off-screen (`Renderer`).
//! 2. Open an isolated presentation surface (`SurfaceLauncher`).
//! 3. Write the sanitized document into it.
//! 4. Race the surface's load-complete signal (plus a settle delay) against a
//!    fallback timer; whichever fires first triggers print.
//! 5. Close the surface after a short delay.
//!
//! The generating flag is cleared on every exit path so the action can be retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::resume::notification::Notification;
use crate::resume::persistence::InFlightGuard;
use crate::resume::render::{PrintableDocument, RenderError, Renderer};

pub const CONTENT_NOT_FOUND_MESSAGE: &str = "Resume content not found";
pub const POPUP_BLOCKED_MESSAGE: &str = "Pop-up blocked. Please allow pop-ups and try again.";
pub const EXPORT_FAILURE_MESSAGE: &str = "Failed to generate PDF. Please try again.";
pub const EXPORT_SUCCESS_MESSAGE: &str =
    "Print dialog opened. Choose 'Save as PDF' in your printer options.";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Resume content not found")]
    ContentNotFound,

    #[error("Pop-up blocked")]
    PopupBlocked,

    #[error("An export is already in progress")]
    InProgress,

    #[error("Print surface failed: {0}")]
    Surface(String),
}

impl ExportError {
    /// The notification shown for this failure.
    pub fn notification(&self) -> Notification {
        match self {
            ExportError::ContentNotFound => Notification::error(CONTENT_NOT_FOUND_MESSAGE),
            ExportError::PopupBlocked => Notification::error(POPUP_BLOCKED_MESSAGE),
            ExportError::InProgress | ExportError::Surface(_) => {
                Notification::error(EXPORT_FAILURE_MESSAGE)
            }
        }
    }
}

impl From<RenderError> for ExportError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::Empty => ExportError::ContentNotFound,
        }
    }
}

/// An isolated, transient surface that can show and print one document.
#[async_trait]
pub trait PresentationSurface: Send {
    fn write(&mut self, document: &PrintableDocument) -> Result<(), ExportError>;

    /// Resolves when the written document has finished loading. May never resolve.
    async fn loaded(&mut self);

    fn is_closed(&self) -> bool;

    fn print(&mut self) -> Result<(), ExportError>;

    fn close(&mut self);
}

/// Opens presentation surfaces. `None` means the environment refused (a blocked pop-up).
pub trait SurfaceLauncher: Send + Sync {
    fn open(&self) -> Option<Box<dyn PresentationSurface>>;

    /// Timers to run this launcher's surfaces with.
    fn timings(&self, configured: ExportTimings) -> ExportTimings {
        configured
    }
}

/// Timers of the print protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTimings {
    /// Settle delay between load-complete and print.
    pub print_delay: Duration,
    /// Print anyway if load-complete has not fired by then.
    pub load_fallback: Duration,
    /// Delay between print and close.
    pub close_delay: Duration,
}

impl Default for ExportTimings {
    fn default() -> Self {
        Self {
            print_delay: Duration::from_millis(500),
            load_fallback: Duration::from_millis(1000),
            close_delay: Duration::from_millis(100),
        }
    }
}

/// How print got triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintTrigger {
    Loaded,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub document: PrintableDocument,
    pub trigger: PrintTrigger,
    /// False when the surface was already closed by the time print was due.
    pub printed: bool,
}

impl ExportReport {
    pub fn notification(&self) -> Notification {
        Notification::success(EXPORT_SUCCESS_MESSAGE)
    }
}

/// One export trigger per editor, guarded by a generating flag.
pub struct ExportPipeline {
    renderer: Arc<dyn Renderer>,
    timings: ExportTimings,
    generating: AtomicBool,
}

impl ExportPipeline {
    pub fn new(renderer: Arc<dyn Renderer>, timings: ExportTimings) -> Self {
        Self {
            renderer,
            timings,
            generating: AtomicBool::new(false),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    pub async fn export(
        &self,
        markdown: &str,
        launcher: &dyn SurfaceLauncher,
    ) -> Result<ExportReport, ExportError> {
        if self
            .generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ExportError::InProgress);
        }
        let _guard = InFlightGuard(&self.generating);

        let result = self.run(markdown, launcher).await;
        match &result {
            Ok(report) => info!(
                "Resume export ready ({} bytes, trigger={:?}, printed={})",
                report.document.html.len(),
                report.trigger,
                report.printed
            ),
            Err(e @ (ExportError::ContentNotFound | ExportError::PopupBlocked)) => {
                warn!("Resume export rejected: {e}")
            }
            Err(e) => error!("PDF generation error: {e}"),
        }
        result
    }

    async fn run(
        &self,
        markdown: &str,
        launcher: &dyn SurfaceLauncher,
    ) -> Result<ExportReport, ExportError> {
        if markdown.trim().is_empty() {
            return Err(ExportError::ContentNotFound);
        }
        let document = self.renderer.render(markdown)?;

        let mut surface = launcher.open().ok_or(ExportError::PopupBlocked)?;
        if let Err(e) = surface.write(&document) {
            surface.close();
            return Err(e);
        }

        let timings = launcher.timings(self.timings);
        let trigger = tokio::select! {
            _ = surface.loaded() => {
                tokio::time::sleep(timings.print_delay).await;
                PrintTrigger::Loaded
            }
            _ = tokio::time::sleep(timings.load_fallback) => PrintTrigger::Fallback,
        };
        debug!("Print triggered by {trigger:?}");

        if surface.is_closed() {
            return Ok(ExportReport {
                document,
                trigger,
                printed: false,
            });
        }

        let printed = surface.print();
        tokio::time::sleep(timings.close_delay).await;
        surface.close();
        printed?;

        Ok(ExportReport {
            document,
            trigger,
            printed: true,
        })
    }
}

/// Surface used when serving exports over HTTP: it keeps the document for the
/// response and loads instantly. Printing happens in the client.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    document: Option<PrintableDocument>,
    closed: bool,
}

#[async_trait]
impl PresentationSurface for HeadlessSurface {
    fn write(&mut self, document: &PrintableDocument) -> Result<(), ExportError> {
        self.document = Some(document.clone());
        Ok(())
    }

    async fn loaded(&mut self) {}

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn print(&mut self) -> Result<(), ExportError> {
        if self.document.is_none() {
            return Err(ExportError::Surface("nothing written".to_string()));
        }
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessLauncher;

impl SurfaceLauncher for HeadlessLauncher {
    fn open(&self) -> Option<Box<dyn PresentationSurface>> {
        Some(Box::new(HeadlessSurface::default()))
    }

    /// The client prints, so there is nothing to settle or close server-side.
    fn timings(&self, configured: ExportTimings) -> ExportTimings {
        ExportTimings {
            print_delay: Duration::ZERO,
            close_delay: Duration::ZERO,
            ..configured
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::render::HtmlPrintRenderer;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct SurfaceLog {
        written: Option<String>,
        printed: usize,
        closed: bool,
    }

    /// Surface whose load signal fires after `load_after`, or never.
    struct ScriptedSurface {
        log: Arc<Mutex<SurfaceLog>>,
        load_after: Option<Duration>,
        closed_by_user: bool,
        fail_print: bool,
    }

    #[async_trait]
    impl PresentationSurface for ScriptedSurface {
        fn write(&mut self, document: &PrintableDocument) -> Result<(), ExportError> {
            self.log.lock().unwrap().written = Some(document.html.clone());
            Ok(())
        }

        async fn loaded(&mut self) {
            match self.load_after {
                Some(delay) => tokio::time::sleep(delay).await,
                None => std::future::pending::<()>().await,
            }
        }

        fn is_closed(&self) -> bool {
            self.closed_by_user || self.log.lock().unwrap().closed
        }

        fn print(&mut self) -> Result<(), ExportError> {
            if self.fail_print {
                return Err(ExportError::Surface("printer offline".to_string()));
            }
            self.log.lock().unwrap().printed += 1;
            Ok(())
        }

        fn close(&mut self) {
            self.log.lock().unwrap().closed = true;
        }
    }

    #[derive(Default)]
    struct ScriptedLauncher {
        log: Arc<Mutex<SurfaceLog>>,
        blocked: bool,
        load_after: Option<Duration>,
        closed_by_user: bool,
        fail_print: bool,
    }

    impl SurfaceLauncher for ScriptedLauncher {
        fn open(&self) -> Option<Box<dyn PresentationSurface>> {
            if self.blocked {
                return None;
            }
            Some(Box::new(ScriptedSurface {
                log: self.log.clone(),
                load_after: self.load_after,
                closed_by_user: self.closed_by_user,
                fail_print: self.fail_print,
            }))
        }
    }

    fn pipeline() -> ExportPipeline {
        ExportPipeline::new(Arc::new(HtmlPrintRenderer), ExportTimings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_content_reports_not_found_and_resets_flag() {
        let pipeline = pipeline();
        let launcher = ScriptedLauncher::default();

        let err = pipeline.export("   ", &launcher).await.unwrap_err();
        assert!(matches!(err, ExportError::ContentNotFound));
        assert_eq!(err.notification().message, CONTENT_NOT_FOUND_MESSAGE);
        assert!(!pipeline.is_generating());
        assert!(launcher.log.lock().unwrap().written.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocked_popup_reports_and_resets_flag() {
        let pipeline = pipeline();
        let launcher = ScriptedLauncher {
            blocked: true,
            ..Default::default()
        };

        let err = pipeline.export("# Ada", &launcher).await.unwrap_err();
        assert!(matches!(err, ExportError::PopupBlocked));
        assert_eq!(err.notification().message, POPUP_BLOCKED_MESSAGE);
        assert!(!pipeline.is_generating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_signal_triggers_print_once_and_closes() {
        let pipeline = pipeline();
        let launcher = ScriptedLauncher {
            load_after: Some(Duration::from_millis(50)),
            ..Default::default()
        };

        let report = pipeline.export("## Skills\n\nRust", &launcher).await.unwrap();
        assert_eq!(report.trigger, PrintTrigger::Loaded);
        assert!(report.printed);
        assert_eq!(report.notification().message, EXPORT_SUCCESS_MESSAGE);

        let log = launcher.log.lock().unwrap();
        assert_eq!(log.printed, 1);
        assert!(log.closed);
        assert!(log.written.as_deref().unwrap().contains("<h2>Skills</h2>"));
        assert!(!pipeline.is_generating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_timer_prints_when_load_never_fires() {
        let pipeline = pipeline();
        let launcher = ScriptedLauncher::default();

        let started = tokio::time::Instant::now();
        let report = pipeline.export("# Ada", &launcher).await.unwrap();
        assert_eq!(report.trigger, PrintTrigger::Fallback);
        assert!(report.printed);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1100) && elapsed < Duration::from_millis(1500));
        assert_eq!(launcher.log.lock().unwrap().printed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_loses_to_fallback() {
        let pipeline = pipeline();
        let launcher = ScriptedLauncher {
            load_after: Some(Duration::from_millis(1500)),
            ..Default::default()
        };

        let report = pipeline.export("# Ada", &launcher).await.unwrap();
        assert_eq!(report.trigger, PrintTrigger::Fallback);
        assert_eq!(launcher.log.lock().unwrap().printed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_surface_closed_by_user_skips_print() {
        let pipeline = pipeline();
        let launcher = ScriptedLauncher {
            closed_by_user: true,
            ..Default::default()
        };

        let report = pipeline.export("# Ada", &launcher).await.unwrap();
        assert!(!report.printed);
        assert_eq!(launcher.log.lock().unwrap().printed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_print_failure_is_generic_and_still_closes() {
        let pipeline = pipeline();
        let launcher = ScriptedLauncher {
            load_after: Some(Duration::ZERO),
            fail_print: true,
            ..Default::default()
        };

        let err = pipeline.export("# Ada", &launcher).await.unwrap_err();
        assert_eq!(err.notification().message, EXPORT_FAILURE_MESSAGE);
        assert!(launcher.log.lock().unwrap().closed);
        assert!(!pipeline.is_generating());

        let retry = ScriptedLauncher {
            load_after: Some(Duration::ZERO),
            ..Default::default()
        };
        assert!(pipeline.export("# Ada", &retry).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_export_while_generating_is_rejected() {
        let pipeline = pipeline();
        let slow = ScriptedLauncher::default();
        let other = ScriptedLauncher::default();

        let (first, second) = tokio::join!(
            pipeline.export("# Ada", &slow),
            pipeline.export("# Ada", &other)
        );
        assert!(first.is_ok());
        assert!(matches!(second, Err(ExportError::InProgress)));
        assert!(other.log.lock().unwrap().written.is_none());
    }

    #[tokio::test]
    async fn test_headless_export_returns_document() {
        let pipeline = ExportPipeline::new(
            Arc::new(HtmlPrintRenderer),
            ExportTimings {
                print_delay: Duration::ZERO,
                load_fallback: Duration::from_secs(5),
                close_delay: Duration::ZERO,
            },
        );
        let report = pipeline.export("# Ada", &HeadlessLauncher).await.unwrap();
        assert_eq!(report.trigger, PrintTrigger::Loaded);
        assert!(report.document.html.contains("<h1>Ada</h1>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_headless_export_skips_print_and_close_delays() {
        let pipeline = pipeline();

        let started = tokio::time::Instant::now();
        let report = pipeline.export("# Ada", &HeadlessLauncher).await.unwrap();
        assert!(report.printed);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
