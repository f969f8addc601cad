//! Renders the index page: the deck's table of contents.

use crate::slide::Slide;
use crate::template::{self, Result};
use gtmpl::{Template, Value};
use std::collections::HashMap;

/// Renders the index page from an index template. The template is handed a
/// `title`, a `heading`, and `slides`: a list of objects with fields
/// `position` (1-based), `title`, and `href`, in deck order.
pub struct IndexRenderer {
    template: Template,
}

impl IndexRenderer {
    /// Creates an [`IndexRenderer`] from a parsed index template.
    pub fn new(template: Template) -> IndexRenderer {
        IndexRenderer { template }
    }

    /// Renders a complete, standalone index document for the ordered
    /// `slides`, with `title` as the document title and `heading` above the
    /// list. Each slide must already have had its title read (see
    /// [`Slide::title`]).
    pub fn render(
        &self,
        title: &str,
        heading: &str,
        slides: &[Slide],
    ) -> Result<String> {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::String(template::html(title)));
        m.insert("heading".to_owned(), Value::String(template::html(heading)));
        m.insert(
            "slides".to_owned(),
            Value::Array(
                slides
                    .iter()
                    .enumerate()
                    .map(|(i, slide)| entry(i + 1, slide))
                    .collect(),
            ),
        );
        template::execute(&self.template, Value::Object(m))
    }
}

fn entry(position: usize, slide: &Slide) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("position".to_owned(), Value::String(position.to_string()));
    m.insert("title".to_owned(), Value::String(slide.title_html()));
    m.insert(
        "href".to_owned(),
        Value::String(template::href(&slide.file_name)),
    );
    Value::Object(m)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::slide::SortKey;
    use crate::template::DEFAULT_INDEX_TEMPLATE;
    use std::path::PathBuf;

    fn slide(file_name: &str, title: Option<&str>) -> Slide {
        Slide {
            file_name: file_name.to_owned(),
            path: PathBuf::from(file_name),
            key: SortKey::from_file_name(file_name),
            title: title.map(str::to_owned),
        }
    }

    fn render(slides: &[Slide]) -> Result<String> {
        IndexRenderer::new(template::parse(DEFAULT_INDEX_TEMPLATE)?)
            .render("Quarterly Review", "Agenda", slides)
    }

    #[test]
    fn test_render_entries_in_order() -> Result<()> {
        let output = render(&[
            slide("slide1.html", Some("A")),
            slide("slide2.html", Some("B")),
            slide("slide3.html", Some("C")),
        ])?;

        assert!(output.contains("<title>Quarterly Review</title>"));
        assert_eq!(3, output.matches(r#"<div class="card">"#).count());

        let positions: Vec<usize> = [
            r#"<a href="slide1.html">"#,
            r#"<span class="slide-num">Slide 1</span>"#,
            r#"<div class="slide-title">A</div>"#,
            r#"<a href="slide2.html">"#,
            r#"<span class="slide-num">Slide 2</span>"#,
            r#"<div class="slide-title">B</div>"#,
            r#"<a href="slide3.html">"#,
            r#"<span class="slide-num">Slide 3</span>"#,
            r#"<div class="slide-title">C</div>"#,
        ]
        .iter()
        .map(|needle| output.find(needle).unwrap())
        .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, positions);
        Ok(())
    }

    #[test]
    fn test_render_title_falls_back_to_file_name() -> Result<()> {
        let output = render(&[slide("q&a.html", None)])?;
        assert!(output.contains(r#"<div class="slide-title">q&amp;a.html</div>"#));
        assert!(output.contains(r#"<a href="q&amp;a.html">"#));
        Ok(())
    }

    #[test]
    fn test_render_escapes_markup_in_titles() -> Result<()> {
        let output = render(&[slide(
            "slide1.html",
            Some("Using <div> vs <span> &amp; more"),
        )])?;
        assert!(output.contains(
            r#"<div class="slide-title">Using &lt;div&gt; vs &lt;span&gt; &amp; more</div>"#
        ));
        assert!(!output.contains("<div> vs"));
        Ok(())
    }

    #[test]
    fn test_render_empty() -> Result<()> {
        let output = render(&[])?;
        assert!(output.contains("<title>Quarterly Review</title>"));
        assert!(output.contains("<h1>Agenda</h1>"));
        assert!(!output.contains("slide-num\">"));
        Ok(())
    }
}
