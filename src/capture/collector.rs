//! Background frame capture.
//!
//! The source runs on its own thread and pushes frames into a bounded
//! channel; the detector blocks on the receiving side until a frame arrives.

use crate::capture::source::FrameSource;
use crate::capture::types::Frame;
use crossbeam_channel::{bounded, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Frames buffered between the capture thread and the detector.
pub const DEFAULT_FRAME_BUFFER: usize = 4;

/// Runs a `FrameSource` on a background thread.
pub struct FrameCollector {
    receiver: Option<Receiver<Frame>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl FrameCollector {
    /// Start capturing from `source`.
    ///
    /// The capture thread ends when the source is exhausted, fails, or the
    /// collector is stopped.
    pub fn spawn<S>(mut source: S, capacity: usize) -> Self
    where
        S: FrameSource + Send + 'static,
    {
        let (sender, receiver) = bounded(capacity.max(1));
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let handle = thread::spawn(move || {
            while flag.load(Ordering::SeqCst) {
                match source.next_frame() {
                    Ok(Some(frame)) => {
                        if sender.send(frame).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("Frame capture stopped: {e}");
                        break;
                    }
                }
            }
            flag.store(false, Ordering::SeqCst);
        });

        Self {
            receiver: Some(receiver),
            running,
            thread_handle: Some(handle),
        }
    }

    /// Block until the next frame is available.
    ///
    /// Returns `None` once the capture thread has finished and every buffered
    /// frame has been handed out.
    pub fn recv(&self) -> Option<Frame> {
        self.receiver.as_ref()?.recv().ok()
    }

    /// Blocking iterator over captured frames.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        std::iter::from_fn(move || self.recv())
    }

    /// Check if the capture thread is still producing frames.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop capturing and wait for the capture thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Dropping the receiver unblocks a producer waiting on a full channel.
        self.receiver.take();
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FrameCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::source::{SyntheticPath, SyntheticSource};

    #[test]
    fn test_collector_delivers_every_frame_in_order() {
        let source = SyntheticSource::new(
            20,
            vec![SyntheticPath::stroke((0.2, 0.5), (0.8, 0.5), 10)],
        );
        let collector = FrameCollector::spawn(source, 2);

        let frames: Vec<Frame> = collector.frames().collect();
        assert_eq!(frames.len(), 10);
        assert!(collector.recv().is_none());
    }

    #[test]
    fn test_stop_unblocks_producer() {
        let source = SyntheticSource::new(
            20,
            vec![SyntheticPath::hold((0.5, 0.5), 1_000)],
        );
        let mut collector = FrameCollector::spawn(source, 1);
        assert!(collector.recv().is_some());

        collector.stop();
        assert!(!collector.is_running());
        assert!(collector.recv().is_none());
    }
}
