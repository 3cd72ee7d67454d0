//! Clip playback
//!
//! A terminal can't show video inline, so clips are handed to an external
//! player. The player process exiting is the "playback ended" event.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::config::PlayerCommand;

pub trait MediaPlayer {
    /// Start playing `clip`, replacing whatever was playing
    fn play(&mut self, clip: &Path) -> Result<()>;
    /// `true` once, when the current clip has finished
    fn poll_ended(&mut self) -> bool;
    fn stop(&mut self);
}

/// Plays clips by spawning a configured player command
pub struct ExternalPlayer {
    command: PlayerCommand,
    child: Option<Child>,
    current: Option<PathBuf>,
}

impl ExternalPlayer {
    pub fn new(command: PlayerCommand) -> Self {
        Self {
            command,
            child: None,
            current: None,
        }
    }
}

impl MediaPlayer for ExternalPlayer {
    fn play(&mut self, clip: &Path) -> Result<()> {
        self.stop();

        let child = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(clip)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start player '{}'", self.command.program))?;

        tracing::info!("Playing {} (pid {})", clip.display(), child.id());
        self.child = Some(child);
        self.current = Some(clip.to_path_buf());
        Ok(())
    }

    fn poll_ended(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                if let Some(clip) = &self.current {
                    tracing::debug!("Playback of {} ended ({})", clip.display(), status);
                }
                self.child = None;
                self.current = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Lost track of player process: {}", e);
                self.child = None;
                self.current = None;
                true
            }
        }
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        self.current = None;
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
