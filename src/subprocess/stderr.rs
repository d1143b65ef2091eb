//! Background draining of a process's diagnostic stream
//!
//! stderr must be read for as long as the process lives: if its pipe fills
//! up the child blocks on write, and a caller blocked on stdout would then
//! wait forever.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

/// Shared accumulator for stderr bytes
#[derive(Debug, Clone, Default)]
pub struct StderrBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl StderrBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn append(&self, chunk: &[u8]) {
        let mut bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        bytes.extend_from_slice(chunk);
    }

    /// Everything collected so far, lossily decoded and trimmed
    pub fn text(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&bytes).trim().to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }
}

/// Spawn a task copying `stream` into `buffer` until EOF or a read error
pub fn spawn_drain<R>(mut stream: R, buffer: StderrBuffer) -> JoinHandle<()>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 4096];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => buffer.append(&chunk[..n]),
                Err(e) => {
                    tracing::debug!("Stopped reading stderr: {}", e);
                    break;
                }
            }
        }
        tracing::trace!("stderr drained");
    })
}
