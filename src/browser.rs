//! Launching articles in an external browser.

use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Browser command is empty")]
    EmptyCommand,
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// The configured browser command line, split on whitespace.
///
/// No shell is involved: the link is passed as one argument as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCommand {
    program: String,
    args: Vec<String>,
}

impl BrowserCommand {
    pub fn parse(command: &str) -> Result<Self, LaunchError> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().ok_or(LaunchError::EmptyCommand)?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// Build the process invocation for `link` without running it.
    pub fn command(&self, link: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(link)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    /// Start the browser on `link` and return without waiting for it.
    ///
    /// The child is reaped on a background task; its exit status is only
    /// logged. Must be called from within a tokio runtime.
    pub fn launch(&self, link: &str) -> Result<(), LaunchError> {
        let mut child = self
            .command(link)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::info!(program = %self.program, link = %link, "Launched browser");

        let program = self.program.clone();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => tracing::debug!(program = %program, %status, "Browser exited"),
                Err(e) => tracing::warn!(program = %program, error = %e, "Failed to wait for browser"),
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args_of(command: &Command) -> Vec<String> {
        command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_bare_program_gets_link_as_only_argument() {
        let browser = BrowserCommand::parse("firefox").unwrap();
        let command = browser.command("http://example.com/a");

        assert_eq!(command.as_std().get_program(), "firefox");
        assert_eq!(args_of(&command), vec!["http://example.com/a"]);
    }

    #[test]
    fn test_link_appended_after_configured_args() {
        let browser = BrowserCommand::parse("  chromium --incognito   --new-window ").unwrap();
        let command = browser.command("http://example.com/b");

        assert_eq!(command.as_std().get_program(), "chromium");
        assert_eq!(
            args_of(&command),
            vec!["--incognito", "--new-window", "http://example.com/b"]
        );
    }

    #[test]
    fn test_link_with_spaces_stays_one_argument() {
        let browser = BrowserCommand::parse("lynx").unwrap();
        let command = browser.command("http://x/a b;rm -rf");

        assert_eq!(args_of(&command), vec!["http://x/a b;rm -rf"]);
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(
            BrowserCommand::parse("   "),
            Err(LaunchError::EmptyCommand)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_existing_program() {
        let browser = BrowserCommand::parse("true").unwrap();
        assert!(browser.launch("http://example.com").is_ok());
    }

    #[tokio::test]
    async fn test_launch_missing_program_fails() {
        let browser = BrowserCommand::parse("grs-definitely-not-a-browser").unwrap();
        let err = browser.launch("http://example.com").unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert!(err.to_string().contains("grs-definitely-not-a-browser"));
    }
}
