//! Platform-controlled streaming sink.

use std::collections::HashSet;
use std::fmt::Display;

use edge_core::{TimingContext, WorkloadError};
use futures::{Sink, SinkExt};

/// State of the streaming sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    /// Initial state, shell not yet sent.
    Initial,
    /// Shell has been sent, sections and patches can be streamed.
    ShellSent,
    /// Response has been completed.
    Completed,
}

/// Streaming sink that enforces the shell-first, patch-later order.
///
/// Generic over any `Sink<Vec<u8>>`, so the same rendering code drives an
/// HTTP body channel in production and an in-memory channel in tests.
///
/// Guarantees:
/// - the shell is written at most once, before anything else;
/// - each boundary patch is written at most once, after the shell;
/// - nothing is written after `complete`.
pub struct StreamingSink<S, E>
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
{
    inner: S,
    state: SinkState,
    timing: TimingContext,
    sections_sent: Vec<String>,
    patches_sent: HashSet<String>,
}

impl<S, E> StreamingSink<S, E>
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
{
    /// Create a new streaming sink.
    pub fn new(sink: S, timing: TimingContext) -> Self {
        Self {
            inner: sink,
            state: SinkState::Initial,
            timing,
            sections_sent: Vec::new(),
            patches_sent: HashSet::new(),
        }
    }

    /// Send the shell HTML. Must be called before any sections.
    pub async fn send_shell(&mut self, html: &str) -> Result<(), WorkloadError> {
        if self.state != SinkState::Initial {
            return Err(WorkloadError::ShellAlreadySent);
        }

        self.timing.mark("shell_start");
        self.write(html.as_bytes().to_vec()).await?;
        self.timing.mark("shell_sent");
        self.state = SinkState::ShellSent;

        Ok(())
    }

    /// Send a named section of the initial response. Shell must be sent first.
    pub async fn send_section(&mut self, name: &str, html: &str) -> Result<(), WorkloadError> {
        self.ensure_open()?;

        self.write(html.as_bytes().to_vec()).await?;
        self.timing.mark(&format!("section_{}_sent", name));
        self.sections_sent.push(name.to_string());

        Ok(())
    }

    /// Send the patch for a boundary. At most once per boundary, after the shell.
    pub async fn send_patch(&mut self, boundary_id: &str, html: &str) -> Result<(), WorkloadError> {
        self.ensure_open()?;
        if self.patches_sent.contains(boundary_id) {
            return Err(WorkloadError::PatchAlreadySent(boundary_id.to_string()));
        }

        self.write(html.as_bytes().to_vec()).await?;
        self.timing.mark(&format!("patch_{}_sent", boundary_id));
        self.patches_sent.insert(boundary_id.to_string());

        Ok(())
    }

    /// Send the closing HTML and complete the response.
    pub async fn complete(&mut self, closing: &str) -> Result<(), WorkloadError> {
        self.ensure_open()?;

        self.write(closing.as_bytes().to_vec()).await?;
        self.inner
            .close()
            .await
            .map_err(|e| WorkloadError::StreamError(e.to_string()))?;
        self.state = SinkState::Completed;
        self.timing.mark("complete");

        Ok(())
    }

    /// Get the list of sections sent.
    pub fn sections_sent(&self) -> &[String] {
        &self.sections_sent
    }

    /// Whether the patch for a boundary has been sent.
    pub fn patch_sent(&self, boundary_id: &str) -> bool {
        self.patches_sent.contains(boundary_id)
    }

    /// Whether the shell has gone out.
    pub fn shell_sent(&self) -> bool {
        self.state != SinkState::Initial
    }

    /// Get timing context reference.
    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    /// Consume the sink and return the inner value.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn ensure_open(&self) -> Result<(), WorkloadError> {
        match self.state {
            SinkState::Initial => Err(WorkloadError::ShellNotSent),
            SinkState::Completed => Err(WorkloadError::Completed),
            SinkState::ShellSent => Ok(()),
        }
    }

    async fn write(&mut self, bytes: Vec<u8>) -> Result<(), WorkloadError> {
        self.inner
            .send(bytes)
            .await
            .map_err(|e| WorkloadError::StreamError(e.to_string()))
    }
}
