//! Where the pipeline gets its input and output paths from.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::terminal::Terminal;

/// Chooses the contract to read and the location to save its revision.
pub trait PathProvider {
    /// Contract to process, or `None` when the user picked nothing.
    fn choose_input(&self) -> Option<PathBuf>;

    /// Save location for the revision. `suggested_name` is offered as the
    /// default file name inside `directory`.
    fn choose_output(&self, suggested_name: &str, directory: &Path) -> Option<PathBuf>;
}

/// Paths fixed up front (command-line flags). Without an explicit output the
/// suggested name next to the input is used.
#[derive(Debug, Clone, Default)]
pub struct FixedPathProvider {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl FixedPathProvider {
    pub fn new(input: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        Self { input, output }
    }
}

impl PathProvider for FixedPathProvider {
    fn choose_input(&self) -> Option<PathBuf> {
        self.input.clone()
    }

    fn choose_output(&self, suggested_name: &str, directory: &Path) -> Option<PathBuf> {
        Some(
            self.output
                .clone()
                .unwrap_or_else(|| directory.join(suggested_name)),
        )
    }
}

/// Paths typed at the console.
pub struct ConsolePathProvider {
    terminal: Terminal,
}

impl ConsolePathProvider {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }
}

/// Strip whitespace and the quotes shells and file managers add when a path
/// is pasted.
fn clean_path_input(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

/// Resolve the typed save location: blank keeps the default, a directory
/// gets the suggested name appended.
fn resolve_output(typed: Option<PathBuf>, suggested_name: &str, directory: &Path) -> PathBuf {
    match typed {
        None => directory.join(suggested_name),
        Some(path) if path.is_dir() => path.join(suggested_name),
        Some(path) => path,
    }
}

impl PathProvider for ConsolePathProvider {
    fn choose_input(&self) -> Option<PathBuf> {
        match self.terminal.read_line("Path to contract file (.pdf or .docx): ") {
            Ok(line) => clean_path_input(&line),
            Err(e) => {
                warn!("Failed to read input path: {e}");
                None
            }
        }
    }

    fn choose_output(&self, suggested_name: &str, directory: &Path) -> Option<PathBuf> {
        let default = directory.join(suggested_name);
        let prompt = format!("Save revised contract to [{}]: ", default.display());
        match self.terminal.read_line(&prompt) {
            Ok(line) => Some(resolve_output(clean_path_input(&line), suggested_name, directory)),
            Err(e) => {
                warn!("Failed to read output path: {e}");
                None
            }
        }
    }
}

/// Native open/save dialogs.
#[cfg(feature = "native-dialogs")]
#[derive(Debug, Clone, Copy, Default)]
pub struct DialogPathProvider;

#[cfg(feature = "native-dialogs")]
impl PathProvider for DialogPathProvider {
    fn choose_input(&self) -> Option<PathBuf> {
        info!("Opening file selection dialog");
        rfd::FileDialog::new()
            .set_title("Select a contract")
            .add_filter("PDF Files", &["pdf"])
            .add_filter("Word Documents", &["docx"])
            .add_filter("All Files", &["*"])
            .pick_file()
    }

    fn choose_output(&self, suggested_name: &str, directory: &Path) -> Option<PathBuf> {
        info!(suggested_name, "Opening save dialog");
        rfd::FileDialog::new()
            .set_title("Save the revised contract")
            .set_directory(directory)
            .set_file_name(suggested_name)
            .add_filter("PDF Files", &["pdf"])
            .add_filter("Word Documents", &["docx"])
            .save_file()
    }
}

/// Default provider for interactive runs.
pub fn interactive_provider(terminal: Terminal, force_console: bool) -> Box<dyn PathProvider> {
    #[cfg(feature = "native-dialogs")]
    {
        if !force_console {
            return Box::new(DialogPathProvider);
        }
    }
    if !force_console {
        info!("Built without native dialogs, reading paths from the console");
    }
    Box::new(ConsolePathProvider::new(terminal))
}
