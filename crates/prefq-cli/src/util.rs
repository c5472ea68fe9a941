use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Component, Path, PathBuf},
};

use anyhow::Context;
use prefq_core::SkipList;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Destination of a command's JSON output: stdout or a file.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `output_path`, or stdout when `None`.
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    /// Opens `output_path` for writing, or locks stdout when `None`.
    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    /// Creates `path`, and its parent directories if missing.
    fn open(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Name of the destination for messages.
    fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    /// Writes `value` as pretty JSON followed by a newline, then flushes.
    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self)
            .with_context(|| format!("Failed to write to {}", self.display_path()))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Reads and deserializes a JSON file. `file_kind` names the file in errors.
pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Lists the PNG files under `dir`, recursively and in sorted order.
///
/// Paths keep `dir` as their prefix and always use `/` as separator so that
/// they match the names stored with the answers on every platform.
pub fn scan_images(dir: &Path) -> anyhow::Result<Vec<String>> {
    let mut filenames = vec![];
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to scan image directory: {}", dir.display()))?;
        if !entry.file_type().is_file() || !is_png(entry.path()) {
            continue;
        }
        match slash_path(entry.path()) {
            Some(filename) => filenames.push(filename),
            None => warn!(path = %entry.path().display(), "skipping non UTF-8 image path"),
        }
    }
    debug!(dir = %dir.display(), count = filenames.len(), "scanned images");
    Ok(filenames)
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

fn slash_path(path: &Path) -> Option<String> {
    let mut parts = vec![];
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_str()?),
            // joins to a leading `/`
            Component::RootDir if parts.is_empty() => parts.push(""),
            Component::RootDir => {}
            _ => parts.push(component.as_os_str().to_str()?),
        }
    }
    Some(parts.join("/"))
}

/// Reads a skip list.
///
/// The file is either a JSON array of image paths or a script that embeds
/// one, such as `const skipImages = [ ... ];`.
pub fn read_skip_list(path: &Path) -> anyhow::Result<SkipList> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read skip list file: {}", path.display()))?;
    let entries = parse_skip_list(&text)
        .with_context(|| format!("Failed to parse skip list file: {}", path.display()))?;
    debug!(path = %path.display(), count = entries.len(), "loaded skip list");
    Ok(SkipList::new(entries))
}

fn parse_skip_list(text: &str) -> anyhow::Result<Vec<String>> {
    if let Ok(entries) = serde_json::from_str(text) {
        return Ok(entries);
    }
    let start = text.find('[').context("no JSON array found")?;
    let end = text[start..]
        .find(']')
        .map(|offset| start + offset)
        .context("unterminated JSON array")?;
    Ok(serde_json::from_str(&text[start..=end])?)
}
