//! Loading and executing the [`gtmpl`] templates that produce the navigation
//! fragment and the index page, plus the escaping helpers for values that are
//! dropped into them. gtmpl doesn't escape anything on its own, so every
//! value handed to a template must already be safe HTML.

use gtmpl::{Context, Template, Value};
use pulldown_cmark::escape::{escape_href, escape_html};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The built-in navigation fragment template.
pub const DEFAULT_NAV_TEMPLATE: &str = include_str!("../templates/nav.html");

/// The built-in index page template.
pub const DEFAULT_INDEX_TEMPLATE: &str =
    include_str!("../templates/index.html");

/// Parses the template at `path`, or `builtin` if no path is given.
pub fn load(path: Option<&Path>, builtin: &str) -> Result<Template> {
    match path {
        None => parse(builtin),
        Some(path) => {
            use std::io::Read;
            let mut contents = String::new();
            File::open(path)
                .and_then(|mut file| file.read_to_string(&mut contents))
                .map_err(|err| Error::OpenTemplateFile {
                    path: path.to_owned(),
                    err,
                })?;
            parse(&contents).map_err(|err| {
                Error::Annotated(
                    format!("parsing template `{}`", path.display()),
                    Box::new(err),
                )
            })
        }
    }
}

/// Parses template source text.
pub fn parse(contents: &str) -> Result<Template> {
    let mut template = Template::default();
    template.parse(contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// Executes `template` against `value` and returns the output.
pub fn execute(template: &Template, value: Value) -> Result<String> {
    let context = Context::from(value).map_err(Error::Execute)?;
    let mut out: Vec<u8> = Vec::new();
    template.execute(&mut out, &context).map_err(Error::Execute)?;
    String::from_utf8(out).map_err(|e| Error::Execute(e.to_string()))
}

/// Escapes text for use as HTML element content or a quoted attribute value.
pub fn html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    // Writing to a `String` can't fail.
    let _ = escape_html(&mut out, s);
    out
}

/// Escapes a link target (a slide file name) for use in an `href`.
pub fn href(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let _ = escape_href(&mut out, s);
    out
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or executing a template.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening or reading template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template source text.
    ParseTemplate(String),

    /// Returned for errors executing a template.
    Execute(String),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Execute(err) => write!(f, "executing template: {}", err),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Execute(_) => None,
            Error::Annotated(_, err) => Some(err),
        }
    }
}
