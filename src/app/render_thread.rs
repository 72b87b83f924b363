//! Background render thread.
//!
//! The event loop must never block on terminal I/O, so drawing happens on a
//! dedicated thread fed with state snapshots over a bounded channel of depth
//! one. Only the latest snapshot matters: a frame that cannot be queued is
//! dropped and the next one takes its place. Closing the channel is the
//! shutdown signal.

use std::io::{self, Stdout};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use super::state::AppState;

/// Raw-mode terminal on the alternate screen. Restored on drop, so however
/// the render thread exits the user gets their shell back.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn open() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            disable_raw_mode().ok();
            return Err(e).context("failed to enter alternate screen");
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                disable_raw_mode().ok();
                Err(e).context("failed to create terminal")
            }
        }
    }

    fn draw(&mut self, state: &AppState) {
        if let Err(e) = self.terminal.draw(|f| crate::ui::render(f, state)) {
            tracing::error!("render failed: {}", e);
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
    }
}

pub struct RenderThread {
    frames: SyncSender<Box<AppState>>,
    handle: JoinHandle<()>,
}

impl RenderThread {
    /// Set up the terminal and start drawing. Setup failures surface here on
    /// the caller, before anything is on screen; the session itself moves
    /// onto the render thread and is torn down when the channel closes.
    pub fn spawn() -> Result<Self> {
        let session = TerminalSession::open()?;
        let (frames, frames_rx) = mpsc::sync_channel::<Box<AppState>>(1);

        let handle = thread::spawn(move || {
            let mut session = session;
            while let Ok(state) = frames_rx.recv() {
                session.draw(&state);
            }
        });

        Ok(Self { frames, handle })
    }

    /// Hand a snapshot to the render thread without blocking.
    pub fn render(&self, state: AppState) {
        match self.frames.try_send(Box::new(state)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::trace!("dropping frame, render thread busy");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("render thread is gone");
            }
        }
    }

    /// Close the frame channel and wait for terminal restoration.
    pub fn shutdown(self) {
        let Self { frames, handle } = self;
        drop(frames);
        handle.join().ok();
    }
}
