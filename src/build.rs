//! Exports the [`build_site`] function which stitches together the high-level
//! steps of linking a deck: discovering and ordering the slides
//! ([`crate::slide`]), injecting a navigation fragment into each one
//! ([`crate::nav`], [`crate::html`]), and writing the index page
//! ([`crate::index`]).

use crate::config::{Config, MissingBody};
use crate::html::{self, Injection};
use crate::index::IndexRenderer;
use crate::nav::{Error as NavError, NavRenderer};
use crate::slide::{discover_slides, Error as DiscoverError};
use crate::template::{
    self, Error as TemplateError, DEFAULT_INDEX_TEMPLATE, DEFAULT_NAV_TEMPLATE,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a build did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// The slides that received navigation, in deck order.
    pub linked: Vec<PathBuf>,

    /// The slides left alone because they have no `<body>`.
    pub skipped: Vec<PathBuf>,

    /// The index page that was written.
    pub index: PathBuf,
}

/// Builds the deck described by a [`Config`]. Slides are processed one at a
/// time: read, titled, given a fresh navigation fragment, and written back in
/// full. The index page is written last, so it is only produced if every slide
/// succeeded. Running the build again over its own output changes nothing.
pub fn build_site(config: &Config) -> Result<Report> {
    // Load the templates before touching any slide so a bad theme can't leave
    // the deck half-linked.
    let nav = NavRenderer::new(
        template::load(config.nav_template.as_deref(), DEFAULT_NAV_TEMPLATE)?,
        &config.index_file_name,
    );
    let index = IndexRenderer::new(template::load(
        config.index_template.as_deref(),
        DEFAULT_INDEX_TEMPLATE,
    )?);

    let mut slides = discover_slides(config)?;
    info!(
        slides = slides.len(),
        directory = %config.source_directory.display(),
        "linking slides"
    );

    let mut report = Report::default();
    for i in 0..slides.len() {
        let contents = read_slide(&slides[i].path)?;
        slides[i].title = html::extract_title(&contents);

        let prev = match i {
            0 => None,
            _ => Some(slides[i - 1].file_name.as_str()),
        };
        let next = slides.get(i + 1).map(|slide| slide.file_name.as_str());
        let fragment = nav.render(prev, next)?;

        let slide = &slides[i];
        match html::inject_nav(&contents, &fragment) {
            Injection::Injected(updated) => {
                write_file(&slide.path, &updated)?;
                debug!(slide = %slide.file_name, "added navigation");
                report.linked.push(slide.path.clone());
            }
            Injection::NoBody => match config.missing_body {
                MissingBody::Skip => {
                    warn!(
                        slide = %slide.file_name,
                        "no <body> to add navigation to; leaving slide as is"
                    );
                    report.skipped.push(slide.path.clone());
                }
                MissingBody::Fail => {
                    return Err(Error::MissingBody(slide.path.clone()))
                }
            },
        }
    }

    let index_path = config.index_path();
    let page = index.render(&config.title, &config.heading, &slides)?;
    write_file(&index_path, &page)?;
    info!(index = %index_path.display(), "wrote index");
    report.index = index_path;
    Ok(report)
}

fn read_slide(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|err| Error::Read {
        path: path.to_owned(),
        err,
    })?;
    String::from_utf8(bytes).map_err(|err| Error::Decode {
        path: path.to_owned(),
        err,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| Error::Write {
        path: path.to_owned(),
        err,
    })
}

/// The result of a build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a deck. Errors can come from discovering
/// slides, loading or executing templates, and reading or writing files.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors listing the slide directory.
    Discover(DiscoverError),

    /// Returned for errors loading templates or rendering the index page.
    Template(TemplateError),

    /// Returned for errors rendering a navigation fragment.
    Nav(NavError),

    /// Returned for I/O problems reading a slide.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when a slide isn't valid UTF-8.
    Decode {
        path: PathBuf,
        err: std::string::FromUtf8Error,
    },

    /// Returned for I/O problems writing a slide or the index page.
    Write { path: PathBuf, err: std::io::Error },

    /// Returned for a slide without a `<body>` when the configuration says
    /// that's fatal.
    MissingBody(PathBuf),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Discover(err) => err.fmt(f),
            Error::Template(err) => err.fmt(f),
            Error::Nav(err) => err.fmt(f),
            Error::Read { path, err } => {
                write!(f, "Reading slide '{}': {}", path.display(), err)
            }
            Error::Decode { path, err } => {
                write!(f, "Decoding slide '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::MissingBody(path) => {
                write!(f, "Slide '{}' has no <body> element", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Discover(err) => Some(err),
            Error::Template(err) => Some(err),
            Error::Nav(err) => Some(err),
            Error::Read { path: _, err } => Some(err),
            Error::Decode { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::MissingBody(_) => None,
        }
    }
}

impl From<DiscoverError> for Error {
    /// Converts [`DiscoverError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: DiscoverError) -> Error {
        Error::Discover(err)
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<NavError> for Error {
    /// Converts [`NavError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: NavError) -> Error {
        Error::Nav(err)
    }
}
