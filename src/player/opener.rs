use std::process::{Child, Command, Stdio};

use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::error::{Error, Result};

/// Hands playback and trailer URLs to the system browser.
pub struct UrlOpener {
    command: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl UrlOpener {
    pub fn new(command: String, args: Vec<String>) -> Self {
        Self {
            command,
            args,
            child: None,
        }
    }

    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.opener.clone(), config.opener_args.clone())
    }

    fn build_command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.command);

        // The TUI owns the terminal
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        for arg in &self.args {
            cmd.arg(arg);
        }
        cmd.arg(url);
        cmd
    }

    pub fn open(&mut self, url: &str) -> Result<()> {
        self.reap();

        debug!(command = %self.command, url = %url, "Launching opener");

        let child = self.build_command(url).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::OpenerNotFound(self.command.clone())
            } else {
                Error::OpenerLaunch(e.to_string())
            }
        })?;

        info!(url = %url, "Opened in browser");
        self.child = Some(child);
        Ok(())
    }

    /// Collect the previous opener process if it has exited.
    fn reap(&mut self) {
        if let Some(ref mut child) = self.child {
            match child.try_wait() {
                Ok(Some(_)) => self.child = None,
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Failed to poll opener process");
                    self.child = None;
                }
            }
        }
    }
}

impl Default for UrlOpener {
    fn default() -> Self {
        Self::from_config(&PlaybackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let opener = UrlOpener::new(
            "firefox".to_string(),
            vec!["--new-window".to_string()],
        );
        let cmd = opener.build_command("https://vidsrc.icu/embed/movie/1");
        assert_eq!(cmd.get_program(), "firefox");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["--new-window", "https://vidsrc.icu/embed/movie/1"]);
    }

    #[test]
    fn test_missing_opener() {
        let mut opener = UrlOpener::new("bingepoint-no-such-opener".to_string(), Vec::new());
        let err = opener.open("https://example.com").unwrap_err();
        assert!(matches!(err, Error::OpenerNotFound(ref c) if c == "bingepoint-no-such-opener"));
    }
}
