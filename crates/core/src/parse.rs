//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types the extractors
//! use to walk a page: CSS-selector lookup, non-recursive child lookup,
//! attribute access and concatenated text.
//!
//! Required lookups ([`Document::find`], [`Element::find`], [`Element::nth`])
//! fail with [`PelotonError::MissingNode`] naming the path that was tried;
//! optional lookups return `Option`.
//!
//! # Example
//!
//! ```rust
//! use peloton_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <div class="w36"><ul><li>a</li></ul><ul><li>b</li><li>c</li></ul></div>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let div = doc.find("div.w36").unwrap();
//! let second = div.nth("ul", 1).unwrap();
//! assert_eq!(second.children("li").len(), 2);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::{PelotonError, Result};

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PelotonError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Represents a parsed HTML document.
///
/// A Document wraps a page and provides methods for querying elements
/// using CSS selectors.
///
/// # Example
///
/// ```rust
/// use peloton_core::parse::Document;
///
/// let html = r#"<table class="basic"><tbody><tr><td>04.10</td></tr></tbody></table>"#;
/// let doc = Document::parse(html).unwrap();
/// assert_eq!(doc.find("table.basic td").unwrap().text(), "04.10");
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// html5ever never rejects input; malformed markup is repaired the way a
    /// browser would repair it (e.g. a missing `<tbody>` is inserted).
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Selects all elements matching a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`PelotonError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(Element::new).collect())
    }

    /// Gets the first element matching a CSS selector, if any.
    pub fn find_optional(&self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(Element::new))
    }

    /// Gets the first element matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`PelotonError::MissingNode`] naming the selector when nothing matches.
    pub fn find(&self, selector: &str) -> Result<Element<'_>> {
        self.find_optional(selector)?.ok_or_else(|| PelotonError::missing(selector))
    }
}

/// A wrapper around scraper's ElementRef.
///
/// Element represents a single node in the document tree. It is `Copy` and
/// borrows from the [`Document`] it came from, so lookups can be chained
/// freely.
///
/// # Example
///
/// ```rust
/// use peloton_core::parse::Document;
///
/// let html = r#"<a href="race/tour-de-france/2020">Tour de France</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = doc.find("a").unwrap();
///
/// assert_eq!(link.text(), "Tour de France");
/// assert_eq!(link.attr("href"), Some("race/tour-de-france/2020"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element,
    /// untrimmed.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text content with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> String {
        self.text().trim().to_string()
    }

    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the value of an attribute that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`PelotonError::MissingAttribute`] if the attribute is absent.
    pub fn required_attr(&self, name: &str) -> Result<&'a str> {
        self.attr(name).ok_or_else(|| PelotonError::MissingAttribute {
            element: self.describe(),
            attribute: name.to_string(),
        })
    }

    /// Gets the tag name of this element.
    ///
    /// Returns the lowercase tag name (e.g., "div", "a", "span").
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Gets the class names of this element in attribute order.
    pub fn classes(&self) -> Vec<&'a str> {
        self.element.value().classes().collect()
    }

    /// Checks whether the element carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.element.value().classes().any(|c| c == class)
    }

    /// Short description used in error paths, e.g. `div.w36`.
    pub fn describe(&self) -> String {
        let mut out = self.tag_name();
        for class in self.classes() {
            out.push('.');
            out.push_str(class);
        }
        out
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`PelotonError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(Element::new).collect())
    }

    /// Gets the first descendant matching a CSS selector, if any.
    pub fn find_optional(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).next().map(Element::new))
    }

    /// Gets the first descendant matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`PelotonError::MissingNode`] with a path such as `div.w36 > ul`.
    pub fn find(&self, selector: &str) -> Result<Element<'a>> {
        self.find_optional(selector)?
            .ok_or_else(|| PelotonError::missing(format!("{} > {}", self.describe(), selector)))
    }

    /// Gets the `index`-th (zero based) descendant matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`PelotonError::MissingNode`] with a path such as `div.w36 > ul[1]`.
    pub fn nth(&self, selector: &str, index: usize) -> Result<Element<'a>> {
        let sel = compile(selector)?;
        self.element
            .select(&sel)
            .nth(index)
            .map(Element::new)
            .ok_or_else(|| PelotonError::missing(format!("{} > {}[{}]", self.describe(), selector, index)))
    }

    /// Gets the direct element children with the given tag name.
    ///
    /// Unlike [`Element::select`] this does not descend into grandchildren.
    pub fn children(&self, tag: &str) -> Vec<Element<'a>> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name().eq_ignore_ascii_case(tag))
            .map(Element::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>Tour de France 2020</title>
        </head>
        <body>
            <div class="w36">
                <ul class="infolist"><li>Date: 29 August 2020</li></ul>
                <ul class="list">
                    <li data-age="21">First<ul><li>nested</li></ul></li>
                    <li>Second</li>
                </ul>
            </div>
            <a href="race/tour-de-france/2020/stage-1">Stage 1</a>
        </body>
        </html>
    "#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        assert_eq!(doc.find("div.w36").unwrap().describe(), "div.w36");
    }

    #[test]
    fn test_select_elements() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let elements = doc.select("ul.list > li").unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[1].text(), "Second");
    }

    #[test]
    fn test_children_are_not_recursive() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let list = doc.find("ul.list").unwrap();

        assert_eq!(list.select("li").unwrap().len(), 3);
        assert_eq!(list.children("li").len(), 2);
    }

    #[test]
    fn test_nth_reports_indexed_path() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let div = doc.find("div.w36").unwrap();

        assert!(div.nth("ul", 1).unwrap().has_class("list"));
        match div.nth("ul", 5) {
            Err(PelotonError::MissingNode { path }) => assert_eq!(path, "div.w36 > ul[5]"),
            other => panic!("expected MissingNode, got {:?}", other),
        }
    }

    #[test]
    fn test_find_missing_node() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();

        assert!(matches!(doc.find("table"), Err(PelotonError::MissingNode { .. })));
        assert!(doc.find_optional("table").unwrap().is_none());
    }

    #[test]
    fn test_element_attributes() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let link = doc.find("a").unwrap();
        let item = doc.find("li[data-age]").unwrap();

        assert_eq!(link.attr("href"), Some("race/tour-de-france/2020/stage-1"));
        assert_eq!(item.required_attr("data-age").unwrap(), "21");
        assert!(matches!(
            item.required_attr("data-points"),
            Err(PelotonError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML).unwrap();
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(PelotonError::HtmlParseError(_))));
    }
}
