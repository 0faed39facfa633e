//! # Session Orchestrator
//!
//! Orchestratore della sessione: possiede il catalogo e guida le fasi
//! in background.
//!
//! ## Fasi:
//! - `Scanning`: attraversamento della cartella, una entry per file trovato
//! - `Probing`: analisi sequenziale dei codec, in ordine di catalogo
//! - `BatchConverting`: ricodifica dei file incompatibili, uno alla volta
//!
//! Una sola fase alla volta; chi chiama resta reattivo e riceve gli eventi
//! sul canale passato al costruttore. La cancellazione è cooperativa: viene
//! controllata tra un passo e l'altro, mai durante un'invocazione di ffprobe
//! o ffmpeg.
//!
//! ## Esempio:
//! ```rust,ignore
//! let (tx, mut rx) = mpsc::channel(config.event_buffer);
//! let session = SessionOrchestrator::new(config, tools, tx);
//! let handle = session.start_scan("/media/movies").await?;
//! while let Some(event) = rx.recv().await { /* ... */ }
//! ```

use crate::{
    codec_probe::CodecProbe,
    config::Config,
    error::CompatError,
    file_manager::FileManager,
    session::{
        catalog::{Catalog, CatalogEntry},
        events::SessionEvent,
        path_resolver::PathResolver,
        tasks::{self, TaskContext},
    },
    tool_resolver::ToolPathResolver,
    video_processor::VideoProcessor,
};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Paths buffered between the blocking walk and the scan phase
const SCAN_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Scanning,
    Probing,
    Ready,
    BatchConverting,
}

impl SessionPhase {
    fn is_busy(self) -> bool {
        !matches!(self, Self::Idle | Self::Ready)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Probing => "probing",
            Self::Ready => "ready",
            Self::BatchConverting => "batch converting",
        };
        f.write_str(label)
    }
}

struct SessionShared {
    config: Arc<Config>,
    tools: Arc<ToolPathResolver>,
    tasks: TaskContext,
    phase: watch::Sender<SessionPhase>,
    cancel: std::sync::Mutex<CancellationToken>,
}

/// Owns the catalog of one session and runs its phases in the background
pub struct SessionOrchestrator {
    shared: Arc<SessionShared>,
}

impl SessionOrchestrator {
    pub fn new(
        config: Arc<Config>,
        tools: Arc<ToolPathResolver>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Idle);
        Self {
            shared: Arc::new(SessionShared {
                config,
                tools,
                tasks: TaskContext::new(Arc::new(Mutex::new(Catalog::new())), events),
                phase,
                cancel: std::sync::Mutex::new(CancellationToken::new()),
            }),
        }
    }

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        *self.shared.phase.borrow()
    }

    /// Copy of the current catalog entries, in catalog order
    pub async fn catalog_snapshot(&self) -> Vec<CatalogEntry> {
        self.shared.tasks.catalog.lock().await.entries().to_vec()
    }

    /// Clear the catalog, walk `root` and then probe every discovered file.
    /// A cancelled scan keeps what it found and does not probe.
    pub async fn start_scan(
        &self,
        root: impl Into<PathBuf>,
    ) -> Result<JoinHandle<()>, CompatError> {
        let root = root.into();
        self.enter_phase(SessionPhase::Scanning)?;
        let token = self.fresh_token();
        self.shared.tasks.catalog.lock().await.clear();

        info!("🔍 Scanning {}", root.display());
        let shared = self.shared.clone();
        Ok(self.spawn_phase(
            |message| SessionEvent::ScanError { message },
            async move {
                let (count, cancelled) = match scan_into_catalog(&shared.tasks, root, &token).await
                {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Scan failed: {}", e);
                        shared
                            .tasks
                            .emit(SessionEvent::ScanError { message: e.to_string() })
                            .await;
                        return;
                    }
                };

                info!("Found {} video files{}", count, if cancelled { " (cancelled)" } else { "" });
                shared
                    .tasks
                    .emit(SessionEvent::ScanFinished { count, cancelled })
                    .await;

                if cancelled || count == 0 {
                    return;
                }
                shared.phase.send_replace(SessionPhase::Probing);
                analyze_catalog(&shared, &token).await;
            },
        ))
    }

    /// Reset every entry and probe the whole catalog again
    pub async fn reanalyze(&self) -> Result<JoinHandle<()>, CompatError> {
        let previous = self.enter_phase(SessionPhase::Probing)?;
        {
            let mut catalog = self.shared.tasks.catalog.lock().await;
            if catalog.is_empty() {
                self.shared.phase.send_replace(previous);
                return Err(CompatError::EmptyCatalog);
            }
            catalog.reset_all();
        }
        let token = self.fresh_token();

        info!("🔄 Re-analyzing catalog");
        let shared = self.shared.clone();
        Ok(self.spawn_phase(
            |message| SessionEvent::AnalysisError { message },
            async move { analyze_catalog(&shared, &token).await },
        ))
    }

    /// Convert every Incompatible entry. `Ok(None)` means there was nothing
    /// to convert. Without `output_dir` the configured output path is used,
    /// then each source's own folder.
    pub async fn batch_convert(
        &self,
        output_dir: Option<PathBuf>,
    ) -> Result<Option<JoinHandle<()>>, CompatError> {
        let previous = self.enter_phase(SessionPhase::BatchConverting)?;
        let selection = self.shared.tasks.catalog.lock().await.incompatible();
        if selection.is_empty() {
            info!("Nothing to convert");
            self.shared.phase.send_replace(previous);
            return Ok(None);
        }
        let token = self.fresh_token();
        let output_dir = output_dir.or_else(|| self.shared.config.output_path.clone());

        info!("🎬 Converting {} incompatible files", selection.len());
        let shared = self.shared.clone();
        Ok(Some(self.spawn_phase(
            |message| SessionEvent::BatchError { message },
            async move { convert_selection(&shared, selection, output_dir, &token).await },
        )))
    }

    /// Transcode one file outside the catalog; the result also arrives as a
    /// `TranscodeFinished` event
    pub fn transcode_single(&self, input: PathBuf, output: PathBuf) -> JoinHandle<bool> {
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let success = match shared.tools.ffmpeg().await {
                Ok(ffmpeg) => {
                    VideoProcessor::new(Some(ffmpeg), &shared.config)
                        .transcode(&input, &output)
                        .await
                }
                Err(e) => {
                    error!("{}", e);
                    false
                }
            };
            shared
                .tasks
                .emit(SessionEvent::TranscodeFinished { input, output, success })
                .await;
            success
        })
    }

    /// Stop the running scan, analysis or batch at its next step
    pub fn cancel(&self) {
        debug!("Cancellation requested");
        self.shared
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    /// Atomically move from Idle/Ready to `next`, returning the previous phase
    fn enter_phase(&self, next: SessionPhase) -> Result<SessionPhase, CompatError> {
        let mut previous = SessionPhase::Idle;
        let mut busy = None;
        self.shared.phase.send_if_modified(|current| {
            if current.is_busy() {
                busy = Some(*current);
                return false;
            }
            previous = *current;
            *current = next;
            true
        });
        match busy {
            Some(phase) => Err(CompatError::SessionBusy(phase.to_string())),
            None => Ok(previous),
        }
    }

    fn fresh_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self
            .shared
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = token.clone();
        token
    }

    /// Run `body` as its own task so a panic becomes an error event; the
    /// session is Ready again afterwards in every case
    fn spawn_phase<F>(&self, on_panic: fn(String) -> SessionEvent, body: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shared = self.shared.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::spawn(body).await {
                error!("Phase task aborted: {}", e);
                shared.tasks.emit(on_panic(e.to_string())).await;
            }
            shared.phase.send_replace(SessionPhase::Ready);
        })
    }
}

/// Walk `root` on the blocking pool and add each file to the catalog.
/// Returns the number of entries and whether the walk was cancelled.
async fn scan_into_catalog(
    tasks: &TaskContext,
    root: PathBuf,
    token: &CancellationToken,
) -> Result<(usize, bool), CompatError> {
    let (tx, mut rx) = mpsc::channel::<PathBuf>(SCAN_CHANNEL_CAPACITY);
    let walk_token = token.clone();
    let walker = tokio::task::spawn_blocking(move || {
        for path in FileManager::walk_media(&root) {
            if walk_token.is_cancelled() || tx.blocking_send(path).is_err() {
                break;
            }
        }
    });

    let mut cancelled = false;
    while let Some(path) = rx.recv().await {
        if token.is_cancelled() {
            cancelled = true;
            break;
        }
        let inserted = tasks.catalog.lock().await.insert(path.clone());
        if inserted.is_some() {
            tasks.emit(SessionEvent::FileDiscovered { path }).await;
        }
    }
    drop(rx);

    walker
        .await
        .map_err(|e| CompatError::Io(std::io::Error::other(e.to_string())))?;

    let count = tasks.catalog.lock().await.len();
    Ok((count, cancelled || token.is_cancelled()))
}

/// Probe every entry in catalog order; stops early only on cancellation
async fn analyze_catalog(shared: &SessionShared, token: &CancellationToken) {
    let ffprobe = match shared.tools.ffprobe().await {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            shared
                .tasks
                .emit(SessionEvent::AnalysisError { message: e.to_string() })
                .await;
            return;
        }
    };
    let probe = CodecProbe::new(ffprobe, shared.config.probe_timeout());

    let total = shared.tasks.catalog.lock().await.len();
    shared.tasks.emit(SessionEvent::AnalysisStarted { total }).await;

    for index in 0..total {
        if token.is_cancelled() {
            warn!("Analysis cancelled after {} of {} files", index, total);
            break;
        }
        shared.tasks.analyze_entry(&probe, index).await;
    }

    let summary = shared.tasks.catalog.lock().await.summary();
    info!("📊 {}", summary.format_summary());
    shared
        .tasks
        .emit(SessionEvent::AnalysisFinished {
            compatible: summary.compatible,
            total: summary.analyzed(),
            failed: summary.failed,
        })
        .await;
}

async fn convert_selection(
    shared: &SessionShared,
    selection: Vec<CatalogEntry>,
    output_dir: Option<PathBuf>,
    token: &CancellationToken,
) {
    let ffmpeg = match shared.tools.ffmpeg().await {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            shared
                .tasks
                .emit(SessionEvent::BatchError { message: e.to_string() })
                .await;
            return;
        }
    };
    if let Some(dir) = &output_dir {
        if let Err(e) = PathResolver::ensure_output_dir(dir).await {
            let message = format!("Cannot create output directory {}: {}", dir.display(), e);
            error!("{}", message);
            shared.tasks.emit(SessionEvent::BatchError { message }).await;
            return;
        }
    }
    let processor = VideoProcessor::new(Some(ffmpeg), &shared.config);

    let total = selection.len();
    let (mut succeeded, mut failed) = (0, 0);
    for (index, entry) in selection.iter().enumerate() {
        if token.is_cancelled() {
            warn!("Batch cancelled after {} of {} files", index, total);
            break;
        }
        shared
            .tasks
            .emit(SessionEvent::BatchProgress { current: index + 1, total })
            .await;

        let success = tasks::convert_entry(&processor, entry, output_dir.as_deref()).await;
        if success {
            succeeded += 1;
        } else {
            failed += 1;
        }
        shared
            .tasks
            .emit(SessionEvent::BatchFileFinished {
                name: entry.display_name().to_string(),
                success,
            })
            .await;
    }

    info!("✅ Batch finished: {} succeeded, {} failed", succeeded, failed);
    shared
        .tasks
        .emit(SessionEvent::BatchFinished { succeeded, failed })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::catalog::CompatibilityState;
    use crate::test_support::touch;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    fn session(
        tools: ToolPathResolver,
        config: Config,
    ) -> (SessionOrchestrator, mpsc::Receiver<SessionEvent>) {
        let (tx, rx) = mpsc::channel(256);
        (SessionOrchestrator::new(Arc::new(config), Arc::new(tools), tx), rx)
    }

    fn collect(rx: &mut mpsc::Receiver<SessionEvent>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_empty_directory_finishes_without_probing() {
        let temp_dir = TempDir::new().unwrap();
        let (session, mut rx) = session(ToolPathResolver::with_locations(None, None), Config::default());

        assert_ok!(session.start_scan(temp_dir.path()).await.unwrap().await);
        let events = collect(&mut rx);
        assert_eq!(events, vec![SessionEvent::ScanFinished { count: 0, cancelled: false }]);
        assert_eq!(session.phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn test_missing_ffprobe_reported_once() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("a.mp4"));
        touch(&temp_dir.path().join("b.mkv"));
        let (session, mut rx) = session(ToolPathResolver::with_locations(None, None), Config::default());

        session.start_scan(temp_dir.path()).await.unwrap().await.unwrap();
        let events = collect(&mut rx);

        let errors = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::AnalysisError { .. }))
            .count();
        assert_eq!(errors, 1);
        assert!(events.contains(&SessionEvent::ScanFinished { count: 2, cancelled: false }));
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::EntryUpdated { .. })));

        let catalog = session.catalog_snapshot().await;
        assert!(catalog.iter().all(|e| e.state() == CompatibilityState::Unanalyzed));
    }

    #[tokio::test]
    async fn test_reanalyze_empty_catalog_is_error() {
        let (session, _rx) = session(ToolPathResolver::with_locations(None, None), Config::default());
        assert!(matches!(session.reanalyze().await, Err(CompatError::EmptyCatalog)));
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[tokio::test]
    async fn test_batch_with_nothing_to_convert() {
        let (session, mut rx) = session(ToolPathResolver::with_locations(None, None), Config::default());
        assert!(session.batch_convert(None).await.unwrap().is_none());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(collect(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_busy_session_rejects_new_phase() {
        let (session, _rx) = session(ToolPathResolver::with_locations(None, None), Config::default());
        session.shared.phase.send_replace(SessionPhase::BatchConverting);

        let err = assert_err!(session.start_scan("/tmp").await);
        assert!(matches!(err, CompatError::SessionBusy(ref p) if p == "batch converting"));
    }

    #[tokio::test]
    async fn test_cancelled_scan_keeps_partial_results() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..5 {
            touch(&temp_dir.path().join(format!("clip{}.mp4", i)));
        }
        // con un buffer di un solo evento lo scan si ferma dopo il primo file
        let (tx, mut rx) = mpsc::channel(1);
        let session = SessionOrchestrator::new(
            Arc::new(Config::default()),
            Arc::new(ToolPathResolver::with_locations(None, None)),
            tx,
        );

        let handle = session.start_scan(temp_dir.path()).await.unwrap();
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, SessionEvent::FileDiscovered { .. }));
        session.cancel();

        let mut rest = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = matches!(event, SessionEvent::ScanFinished { .. });
            rest.push(event);
            if done {
                break;
            }
        }
        handle.await.unwrap();

        let discovered = 1 + rest
            .iter()
            .filter(|e| matches!(e, SessionEvent::FileDiscovered { .. }))
            .count();
        assert_eq!(
            rest.last(),
            Some(&SessionEvent::ScanFinished { count: discovered, cancelled: true })
        );
        assert!(discovered < 5);
        assert_eq!(session.catalog_snapshot().await.len(), discovered);
        assert!(collect(&mut rx).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_scan_probe_and_batch_end_to_end() {
        use crate::test_support::{fake_ffmpeg, fake_ffprobe};

        let tools_dir = TempDir::new().unwrap();
        let media_dir = TempDir::new().unwrap();
        touch(&media_dir.path().join("a_h264_aac.mp4"));
        touch(&media_dir.path().join("b_hevc_vorbis.mkv"));
        touch(&media_dir.path().join("c_hang.avi"));
        touch(&media_dir.path().join("d_broken.webm"));
        touch(&media_dir.path().join("notes.txt"));

        let tools = ToolPathResolver::with_locations(
            Some(fake_ffprobe(tools_dir.path())),
            Some(fake_ffmpeg(tools_dir.path())),
        );
        let config = Config {
            probe_timeout_secs: 1,
            ..Default::default()
        };
        let (session, mut rx) = session(tools, config);

        session.start_scan(media_dir.path()).await.unwrap().await.unwrap();
        let events = collect(&mut rx);

        let discovered: Vec<String> = events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::FileDiscovered { path } => {
                    Some(path.file_name().unwrap().to_string_lossy().into_owned())
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            discovered,
            vec!["a_h264_aac.mp4", "b_hevc_vorbis.mkv", "c_hang.avi", "d_broken.webm"]
        );
        assert!(events.contains(&SessionEvent::AnalysisStarted { total: 4 }));
        assert_eq!(
            events.last(),
            Some(&SessionEvent::AnalysisFinished { compatible: 1, total: 3, failed: 1 })
        );

        let states: Vec<CompatibilityState> =
            session.catalog_snapshot().await.iter().map(|e| e.state()).collect();
        assert_eq!(
            states,
            vec![
                CompatibilityState::Compatible,
                CompatibilityState::Incompatible,
                CompatibilityState::AnalysisFailed,
                CompatibilityState::Incompatible,
            ]
        );

        // una collisione già presente nella cartella di output
        let out_dir = media_dir.path().join("out");
        touch(&out_dir.join("b_hevc_vorbis_converted.mkv"));
        session
            .batch_convert(Some(out_dir.clone()))
            .await
            .unwrap()
            .unwrap()
            .await
            .unwrap();
        let events = collect(&mut rx);
        assert_eq!(
            events,
            vec![
                SessionEvent::BatchProgress { current: 1, total: 2 },
                SessionEvent::BatchFileFinished { name: "b_hevc_vorbis.mkv".to_string(), success: true },
                SessionEvent::BatchProgress { current: 2, total: 2 },
                SessionEvent::BatchFileFinished { name: "d_broken.webm".to_string(), success: false },
                SessionEvent::BatchFinished { succeeded: 1, failed: 1 },
            ]
        );
        assert!(out_dir.join("b_hevc_vorbis_converted_1.mkv").exists());
        assert_eq!(session.phase(), SessionPhase::Ready);

        session.reanalyze().await.unwrap().await.unwrap();
        let events = collect(&mut rx);
        assert_eq!(
            events.last(),
            Some(&SessionEvent::AnalysisFinished { compatible: 1, total: 3, failed: 1 })
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_analysis_leaves_rest_unanalyzed() {
        use crate::test_support::fake_ffprobe;

        let tools_dir = TempDir::new().unwrap();
        let media_dir = TempDir::new().unwrap();
        touch(&media_dir.path().join("a_hang.avi"));
        touch(&media_dir.path().join("b_h264_aac.mp4"));
        touch(&media_dir.path().join("c_hevc_vorbis.mkv"));

        let tools = ToolPathResolver::with_locations(Some(fake_ffprobe(tools_dir.path())), None);
        let config = Config {
            probe_timeout_secs: 1,
            ..Default::default()
        };
        let (session, mut rx) = session(tools, config);
        let handle = session.start_scan(media_dir.path()).await.unwrap();

        // il primo file resta appeso fino al timeout: si annulla in quel momento
        loop {
            match rx.recv().await.unwrap() {
                SessionEvent::EntryUpdated { index: 0, entry }
                    if entry.state() == CompatibilityState::Analyzing =>
                {
                    break
                }
                _ => {}
            }
        }
        session.cancel();
        handle.await.unwrap();

        let events = collect(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            SessionEvent::EntryUpdated { index: 0, entry } if entry.state() == CompatibilityState::AnalysisFailed
        ));
        assert_eq!(
            events[1],
            SessionEvent::AnalysisFinished { compatible: 0, total: 0, failed: 1 }
        );

        let states: Vec<CompatibilityState> =
            session.catalog_snapshot().await.iter().map(|e| e.state()).collect();
        assert_eq!(
            states,
            vec![
                CompatibilityState::AnalysisFailed,
                CompatibilityState::Unanalyzed,
                CompatibilityState::Unanalyzed,
            ]
        );
        assert_eq!(session.phase(), SessionPhase::Ready);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_batch_reports_partial_counts() {
        use crate::test_support::{fake_ffmpeg, fake_ffprobe};

        let tools_dir = TempDir::new().unwrap();
        let media_dir = TempDir::new().unwrap();
        for name in ["a_slow.avi", "b.avi", "c.avi"] {
            touch(&media_dir.path().join(name));
        }

        let tools = ToolPathResolver::with_locations(
            Some(fake_ffprobe(tools_dir.path())),
            Some(fake_ffmpeg(tools_dir.path())),
        );
        let (session, mut rx) = session(tools, Config::default());
        session.start_scan(media_dir.path()).await.unwrap().await.unwrap();
        collect(&mut rx);

        let handle = session.batch_convert(None).await.unwrap().unwrap();
        assert_eq!(
            rx.recv().await,
            Some(SessionEvent::BatchProgress { current: 1, total: 3 })
        );
        session.cancel();
        handle.await.unwrap();

        // il file in corso termina, gli altri non partono
        assert_eq!(
            collect(&mut rx),
            vec![
                SessionEvent::BatchFileFinished { name: "a_slow.avi".to_string(), success: true },
                SessionEvent::BatchFinished { succeeded: 1, failed: 0 },
            ]
        );
        assert!(media_dir.path().join("a_slow_converted.avi").exists());
        assert!(!media_dir.path().join("b_converted.avi").exists());
        assert_eq!(session.phase(), SessionPhase::Ready);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_batch_collisions_in_source_folder() {
        use crate::test_support::{fake_ffmpeg, fake_ffprobe};

        let tools_dir = TempDir::new().unwrap();
        let media_dir = TempDir::new().unwrap();
        touch(&media_dir.path().join("movie_hevc_vorbis.mkv"));
        touch(&media_dir.path().join("movie_hevc_vorbis_converted.mkv"));

        let tools = ToolPathResolver::with_locations(
            Some(fake_ffprobe(tools_dir.path())),
            Some(fake_ffmpeg(tools_dir.path())),
        );
        let (session, mut rx) = session(tools, Config::default());
        session.start_scan(media_dir.path()).await.unwrap().await.unwrap();

        // anche il file già convertito viene trovato ed è incompatibile
        for _ in 0..2 {
            session.batch_convert(None).await.unwrap().unwrap().await.unwrap();
        }
        collect(&mut rx);

        let dir = media_dir.path();
        assert!(dir.join("movie_hevc_vorbis_converted_1.mkv").exists());
        assert!(dir.join("movie_hevc_vorbis_converted_converted.mkv").exists());
        assert!(dir.join("movie_hevc_vorbis_converted_2.mkv").exists());
        assert!(dir.join("movie_hevc_vorbis_converted_converted_1.mkv").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_single_transcode_reports_event() {
        use crate::test_support::fake_ffmpeg;

        let temp_dir = TempDir::new().unwrap();
        let tools = ToolPathResolver::with_locations(None, Some(fake_ffmpeg(temp_dir.path())));
        let (session, mut rx) = session(tools, Config::default());

        let input = temp_dir.path().join("clip.avi");
        let output = temp_dir.path().join("clip_converted.mp4");
        assert!(session.transcode_single(input.clone(), output.clone()).await.unwrap());
        assert_eq!(
            rx.recv().await,
            Some(SessionEvent::TranscodeFinished { input, output, success: true })
        );
    }
}
