//! Build configuration. A deck works without any configuration at all; a
//! `slidenav.yaml` project file next to the slides (or one passed explicitly)
//! can override the index file name, the slide extensions, the index page's
//! title and heading,
//! the missing-body policy, and the theme templates.

use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The name of the project file looked for in the slide directory.
pub const PROJECT_FILE: &str = "slidenav.yaml";

const DEFAULT_INDEX_FILE: &str = "index.html";
const DEFAULT_EXTENSION: &str = ".html";
const DEFAULT_TITLE: &str = "Presentation - Home";
const DEFAULT_HEADING: &str = "Presentation Overview";

/// What to do with a slide that has no `<body>` to put navigation into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingBody {
    /// Log a warning and leave the slide as it is.
    Skip,

    /// Abort the build.
    Fail,
}

impl Default for MissingBody {
    fn default() -> Self {
        MissingBody::Skip
    }
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default)]
    index_file: Option<String>,

    #[serde(default)]
    extensions: Option<Vec<String>>,

    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    heading: Option<String>,

    #[serde(default)]
    missing_body: MissingBody,

    #[serde(default)]
    theme: Theme,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Theme {
    #[serde(default)]
    index_template: Option<PathBuf>,

    #[serde(default)]
    nav_template: Option<PathBuf>,
}

/// Everything [`crate::build::build_site`] needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The directory holding the slides. The index page is written here too.
    pub source_directory: PathBuf,

    /// The index page's file name. Every home link points here, and this file
    /// is never treated as a slide.
    pub index_file_name: String,

    /// File name suffixes that mark a file as a slide (e.g., `.html`).
    pub extensions: Vec<String>,

    /// The index page's document `<title>`.
    pub title: String,

    /// The index page's `<h1>`.
    pub heading: String,

    /// See [`MissingBody`].
    pub missing_body: MissingBody,

    /// A replacement for the built-in index template.
    pub index_template: Option<PathBuf>,

    /// A replacement for the built-in navigation fragment template.
    pub nav_template: Option<PathBuf>,
}

impl Config {
    /// The default configuration for the slides in `source_directory`.
    pub fn new(source_directory: &Path) -> Config {
        Config {
            source_directory: source_directory.to_owned(),
            index_file_name: DEFAULT_INDEX_FILE.to_owned(),
            extensions: vec![DEFAULT_EXTENSION.to_owned()],
            title: DEFAULT_TITLE.to_owned(),
            heading: DEFAULT_HEADING.to_owned(),
            missing_body: MissingBody::default(),
            index_template: None,
            nav_template: None,
        }
    }

    /// Loads `{dir}/slidenav.yaml` if there is one, or falls back to
    /// [`Config::new`].
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.is_file() {
            Config::from_project_file(dir, &path)
        } else {
            Ok(Config::new(dir))
        }
    }

    /// Loads the project file at `path` for the slides in `source_directory`.
    /// Theme template paths are relative to the project file's directory.
    pub fn from_project_file(source_directory: &Path, path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project =
            serde_yaml::from_reader(file).map_err(|err| Error::DeserializeYaml {
                path: path.to_owned(),
                err,
            })?;
        let project_root = path.parent().unwrap_or_else(|| Path::new(""));
        Config::from_project(source_directory, project_root, project)
    }

    fn from_project(
        source_directory: &Path,
        project_root: &Path,
        project: Project,
    ) -> Result<Config> {
        let mut config = Config::new(source_directory);
        if let Some(index_file) = project.index_file {
            if index_file.is_empty() || index_file.contains(&['/', '\\'][..]) {
                return Err(Error::Invalid(format!(
                    "`index_file` must be a plain file name, got `{}`",
                    index_file
                )));
            }
            config.index_file_name = index_file;
        }
        if let Some(extensions) = project.extensions {
            if extensions.is_empty() || extensions.iter().any(String::is_empty) {
                return Err(Error::Invalid(
                    "`extensions` must list at least one non-empty suffix"
                        .to_owned(),
                ));
            }
            config.extensions = extensions;
        }
        if let Some(title) = project.title {
            config.title = title;
        }
        if let Some(heading) = project.heading {
            config.heading = heading;
        }
        config.missing_body = project.missing_body;
        config.index_template = project
            .theme
            .index_template
            .map(|relpath| project_root.join(relpath));
        config.nav_template = project
            .theme
            .nav_template
            .map(|relpath| project_root.join(relpath));
        Ok(config)
    }

    /// Reports whether a file called `file_name` in the source directory is a
    /// slide.
    pub fn is_slide(&self, file_name: &str) -> bool {
        file_name != self.index_file_name
            && self
                .extensions
                .iter()
                .any(|extension| file_name.ends_with(extension.as_str()))
    }

    /// Where the index page is written.
    pub fn index_path(&self) -> PathBuf {
        self.source_directory.join(&self.index_file_name)
    }
}

/// The result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML or has unknown or
    /// mistyped fields.
    DeserializeYaml { path: PathBuf, err: serde_yaml::Error },

    /// Returned when a field has an unusable value.
    Invalid(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening project file `{}`: {}", path.display(), err)
            }
            Error::DeserializeYaml { path, err } => {
                write!(f, "Loading configuration `{}`: {}", path.display(), err)
            }
            Error::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::DeserializeYaml { path: _, err } => Some(err),
            Error::Invalid(_) => None,
        }
    }
}
