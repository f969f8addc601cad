//! Renders the floating previous / home / next navigation fragment that gets
//! injected into every slide.

use crate::html;
use crate::template;
use gtmpl::{Template, Value};
use std::collections::HashMap;
use std::fmt;

/// Renders navigation fragments from a nav template. The template is handed
/// `prev` and `next` (escaped link targets, or nil at either end of the deck)
/// and `home`.
pub struct NavRenderer {
    template: Template,

    /// The escaped link target for the home link, i.e. the index page.
    home: String,
}

impl NavRenderer {
    /// Constructs a new renderer. `home` is the file name of the index page.
    pub fn new(template: Template, home: &str) -> NavRenderer {
        NavRenderer {
            template,
            home: template::href(home),
        }
    }

    /// Renders the fragment for a slide whose neighbors are `prev` and `next`.
    /// The output is trimmed, depends only on the arguments, and is checked to
    /// be a single container carrying [`html::NAV_MARKER`].
    pub fn render(&self, prev: Option<&str>, next: Option<&str>) -> Result<String> {
        let link = |target: Option<&str>| match target {
            Some(target) => Value::String(template::href(target)),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("prev".to_owned(), link(prev));
        m.insert("next".to_owned(), link(next));
        m.insert("home".to_owned(), Value::String(self.home.clone()));

        let fragment = template::execute(&self.template, Value::Object(m))?
            .trim()
            .to_owned();
        if !html::is_single_nav_fragment(&fragment) {
            return Err(Error::MissingMarker);
        }
        Ok(fragment)
    }
}

/// The result of a fallible fragment-rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering a navigation fragment.
#[derive(Debug)]
pub enum Error {
    /// An error executing the nav template.
    Template(template::Error),

    /// Returned when the rendered fragment isn't a single `<div>` carrying the
    /// marker attribute. Slides linked with such a fragment could not have it
    /// replaced on the next run.
    MissingMarker,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::MissingMarker => write!(
                f,
                "nav template must render a single `<div {}>` element",
                html::NAV_MARKER
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::MissingMarker => None,
        }
    }
}

impl From<template::Error> for Error {
    /// Converts a [`template::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for template execution.
    fn from(err: template::Error) -> Error {
        Error::Template(err)
    }
}
