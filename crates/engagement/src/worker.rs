//! Analyzer task owning all per-session state

use crate::analysis::{FrameAnalysis, SessionSummary};
use crate::{EngagementAnalyzer, EngagementError};
use emotion_inference::EmotionClassifier;
use face_features::FaceMeshDetector;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use video_frame::VideoFrame;

enum Request {
    Analyze {
        frame: VideoFrame,
        reply: oneshot::Sender<FrameAnalysis>,
    },
    Summary {
        reply: oneshot::Sender<SessionSummary>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle to an analyzer running in its own task
#[derive(Clone)]
pub struct AnalyzerHandle {
    tx: mpsc::Sender<Request>,
}

/// Move `analyzer` into a task that serves requests one at a time.
///
/// The task ends once every handle has been dropped.
pub fn spawn_analyzer<D, C>(analyzer: EngagementAnalyzer<D, C>) -> (AnalyzerHandle, JoinHandle<()>)
where
    D: FaceMeshDetector + 'static,
    C: EmotionClassifier + 'static,
{
    let (tx, mut rx) = mpsc::channel(analyzer.config().worker_queue);
    let task = tokio::spawn(async move {
        let mut analyzer = analyzer;
        info!("Engagement analyzer task started");
        while let Some(request) = rx.recv().await {
            match request {
                Request::Analyze { frame, reply } => {
                    let analysis = analyzer.analyze(&frame).await;
                    if reply.send(analysis).is_err() {
                        debug!("Caller dropped before frame {} completed", frame.sequence);
                    }
                }
                Request::Summary { reply } => {
                    let _ = reply.send(analyzer.summary());
                }
                Request::Reset { reply } => {
                    analyzer.reset_session();
                    let _ = reply.send(());
                }
            }
        }
        info!("Engagement analyzer task stopped");
    });

    (AnalyzerHandle { tx }, task)
}

impl AnalyzerHandle {
    /// Analyze a frame on the owning task
    pub async fn analyze(&self, frame: VideoFrame) -> Result<FrameAnalysis, EngagementError> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Analyze { frame, reply }).await?;
        rx.await.map_err(|_| EngagementError::WorkerClosed)
    }

    pub async fn summary(&self) -> Result<SessionSummary, EngagementError> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Summary { reply }).await?;
        rx.await.map_err(|_| EngagementError::WorkerClosed)
    }

    pub async fn reset_session(&self) -> Result<(), EngagementError> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Reset { reply }).await?;
        rx.await.map_err(|_| EngagementError::WorkerClosed)
    }

    async fn request(&self, request: Request) -> Result<(), EngagementError> {
        self.tx
            .send(request)
            .await
            .map_err(|_| EngagementError::WorkerClosed)
    }
}
