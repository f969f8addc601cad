//! Defines the [`Slide`] and [`SortKey`] types and the logic for discovering
//! slides on disk and putting them in deck order.

use crate::config::Config;
use crate::template;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Orders slides by the first number in their file name. Unnumbered slides
/// sort after every numbered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortKey {
    Numbered(u64),
    Unnumbered,
}

impl SortKey {
    /// Extracts the key from the first maximal run of ASCII digits in
    /// `file_name`. Numbers too large for a `u64` saturate.
    pub fn from_file_name(file_name: &str) -> SortKey {
        let digits = file_name
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .split(|c: char| !c.is_ascii_digit())
            .next()
            .unwrap_or("");
        if digits.is_empty() {
            return SortKey::Unnumbered;
        }
        SortKey::Numbered(digits.parse().unwrap_or(u64::MAX))
    }
}

/// A single HTML slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    /// The file name, which is also the slide's link target.
    pub file_name: String,

    /// The slide's location on disk.
    pub path: PathBuf,

    /// The slide's position key.
    pub key: SortKey,

    /// The text of the slide's `<title>`, as HTML. This is `None` until the
    /// slide has been read, and stays `None` if it has no usable title.
    pub title: Option<String>,
}

impl Slide {
    fn new(file_name: String, path: PathBuf) -> Slide {
        Slide {
            key: SortKey::from_file_name(&file_name),
            file_name,
            path,
            title: None,
        }
    }

    /// The slide's display title as HTML: its `<title>` text, or else its
    /// escaped file name. `<title>` content is raw text, so a literal `<` or
    /// `>` in it is escaped while character references are kept as written.
    pub fn title_html(&self) -> String {
        match &self.title {
            Some(title) => title.replace('<', "&lt;").replace('>', "&gt;"),
            None => template::html(&self.file_name),
        }
    }
}

/// Lists the slides in `config.source_directory` in deck order. A slide is
/// any regular file (or symlink to one) directly inside the directory whose
/// name ends with one of the configured extensions, other than the index page
/// itself. Entries are visited in file-name order, so slides with equal keys
/// keep that order.
pub fn discover_slides(config: &Config) -> Result<Vec<Slide>> {
    let mut slides = Vec::new();
    for result in WalkDir::new(&config.source_directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = result?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| InvalidFileNameError(entry.path().to_owned()))?;
        if config.is_slide(file_name) {
            slides.push(Slide::new(
                file_name.to_owned(),
                entry.path().to_owned(),
            ));
        }
    }
    Ok(order_slides(slides))
}

/// Sorts slides by [`SortKey`]. The sort is stable.
pub fn order_slides(mut slides: Vec<Slide>) -> Vec<Slide> {
    slides.sort_by_key(|slide| slide.key);
    slides
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl InvalidFileNameError {
    /// The offending path.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid file name: {:?}", &self.0)
    }
}

impl std::error::Error for InvalidFileNameError {
    /// Implements the [`std::error::Error`] trait for
    /// [`InvalidFileNameError`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Represents the result of slide discovery.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error discovering slides.
#[derive(Debug)]
pub enum Error {
    /// Returned when the slide directory (or an entry in it) can't be read.
    WalkDir(walkdir::Error),

    /// Returned when a file name isn't valid UTF-8.
    InvalidFileName(InvalidFileNameError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::WalkDir(err) => write!(f, "listing slides: {}", err),
            Error::InvalidFileName(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while walking the slide directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<InvalidFileNameError> for Error {
    fn from(err: InvalidFileNameError) -> Error {
        Error::InvalidFileName(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_sort_key() {
        assert_eq!(SortKey::Numbered(1), SortKey::from_file_name("slide1.html"));
        assert_eq!(SortKey::Numbered(12), SortKey::from_file_name("12-intro.html"));
        assert_eq!(SortKey::Numbered(7), SortKey::from_file_name("s007_v2.html"));
        assert_eq!(SortKey::Unnumbered, SortKey::from_file_name("outro.html"));
        assert_eq!(
            SortKey::Numbered(u64::MAX),
            SortKey::from_file_name("slide99999999999999999999999.html"),
        );
    }

    #[test]
    fn test_unnumbered_sorts_last() {
        assert!(SortKey::Numbered(u64::MAX) < SortKey::Unnumbered);
        assert!(SortKey::Numbered(2) < SortKey::Numbered(10));
    }

    fn names(slides: &[Slide]) -> Vec<&str> {
        slides.iter().map(|s| s.file_name.as_str()).collect()
    }

    #[test]
    fn test_order_slides_is_stable() {
        let slides = ["b.html", "slide10.html", "a.html", "x2.html", "slide2.html"]
            .iter()
            .map(|name| Slide::new(name.to_string(), PathBuf::from(*name)))
            .collect();
        assert_eq!(
            vec!["x2.html", "slide2.html", "slide10.html", "b.html", "a.html"],
            names(&order_slides(slides)),
        );
    }

    #[test]
    fn test_discover_slides() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        for name in &[
            "slide3.html",
            "slide1.html",
            "slide2.html",
            "index.html",
            "notes.txt",
            "appendix.html",
        ] {
            fs::write(dir.path().join(name), "<html></html>")?;
        }
        fs::create_dir(dir.path().join("slide0.html"))?;

        let slides = discover_slides(&Config::new(dir.path()))?;
        assert_eq!(
            vec!["slide1.html", "slide2.html", "slide3.html", "appendix.html"],
            names(&slides),
        );
        assert_eq!(dir.path().join("slide1.html"), slides[0].path);
        assert!(slides.iter().all(|s| s.title.is_none()));
        Ok(())
    }

    #[test]
    fn test_discover_slides_missing_directory() {
        let config = Config::new(Path::new("/nonexistent/slides"));
        match discover_slides(&config) {
            Err(Error::WalkDir(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_title_html_fallback() {
        let mut slide = Slide::new("a<b>.html".to_owned(), PathBuf::from("x"));
        assert_eq!("a&lt;b&gt;.html", slide.title_html());
        slide.title = Some("Intro &amp; Goals".to_owned());
        assert_eq!("Intro &amp; Goals", slide.title_html());
        slide.title = Some("Using <div> & <span>".to_owned());
        assert_eq!("Using &lt;div&gt; & &lt;span&gt;", slide.title_html());
    }
}
