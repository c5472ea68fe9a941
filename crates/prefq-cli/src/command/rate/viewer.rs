use std::{
    path::PathBuf,
    process::{Child, Command, Stdio},
};

use tracing::{debug, warn};

/// External image viewer showing the current question.
///
/// At most one viewer process is kept alive; showing a new image closes the
/// previous one.
#[derive(Debug)]
pub struct Viewer {
    program: String,
    args: Vec<String>,
    root: PathBuf,
    child: Option<Child>,
}

impl Viewer {
    /// Parses a whitespace-separated command line. Returns `None` when blank.
    pub fn new(command: &str, root: PathBuf) -> Option<Self> {
        let mut words = command.split_whitespace().map(str::to_owned);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
            root,
            child: None,
        })
    }

    /// Opens `filename`, resolved against the image root.
    pub fn show(&mut self, filename: &str) {
        self.close();
        let path = self.root.join(filename);
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => {
                debug!(path = %path.display(), pid = child.id(), "viewer started");
                self.child = Some(child);
            }
            Err(error) => warn!(program = %self.program, %error, "failed to start image viewer"),
        }
    }

    fn close(&mut self) {
        if let Some(mut child) = self.child.take() {
            // the viewer may already have been closed by the rater
            _ = child.kill();
            _ = child.wait();
        }
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.close();
    }
}
