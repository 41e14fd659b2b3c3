//! Failing accessors over a parsed HTML document.
//!
//! Every lookup either returns exactly the expected shape or an
//! [`ErrorKind::Structure`](crate::error::ErrorKind::Structure) error.
//! Locations are CSS selectors. Lookups below an element are anchored with
//! `:scope`, so `:scope > td` means the element's own cells only. html5ever
//! wraps bare table rows in `tbody`, so selectors that reach table rows spell
//! the `tbody` step out.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{ErrorKind, Result, structure};

// Only the start of a document is searched for a declared encoding.
const PRESCAN_LIMIT: usize = 1024;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_.:-]+)"#)
        .expect("meta charset pattern is valid")
});

pub fn document_from_string(html: &str) -> Html {
    Html::parse_document(html)
}

/// Parses raw body bytes, decoding them with the encoding named by a byte
/// order mark or a `<meta>` charset declaration, UTF-8 otherwise.
pub fn document_from_bytes(content: &[u8]) -> Html {
    let encoding = declared_encoding(content).unwrap_or(UTF_8);
    let (html, _, _) = encoding.decode(content);
    Html::parse_document(&html)
}

fn declared_encoding(content: &[u8]) -> Option<&'static Encoding> {
    if let Some((encoding, _)) = Encoding::for_bom(content) {
        return Some(encoding);
    }
    let head = &content[..content.len().min(PRESCAN_LIMIT)];
    let label = META_CHARSET.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes()).map(Encoding::output_encoding)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ErrorKind::InvalidArgument(format!("invalid selector {css:?}: {e}")).into())
}

/// All elements matching `css`, in document order.
pub fn select<'a>(document: &'a Html, css: &str) -> Result<Vec<ElementRef<'a>>> {
    Ok(document.select(&selector(css)?).collect())
}

/// All elements below `element` matching `css`.
pub fn select_from<'a>(element: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
    Ok(element.select(&selector(css)?).collect())
}

fn only_one<'a>(found: Vec<ElementRef<'a>>, css: &str) -> Result<ElementRef<'a>> {
    match <[ElementRef<'a>; 1]>::try_from(found) {
        Ok([element]) => Ok(element),
        Err(found) => Err(structure(format!(
            "expected exactly one element at {css:?}, found {}",
            found.len()
        ))),
    }
}

pub fn select_one<'a>(document: &'a Html, css: &str) -> Result<ElementRef<'a>> {
    only_one(select(document, css)?, css)
}

pub fn select_one_from<'a>(element: ElementRef<'a>, css: &str) -> Result<ElementRef<'a>> {
    only_one(select_from(element, css)?, css)
}

/// Concatenated text of the element and all of its descendants.
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Every descendant text node, in document order.
pub fn texts<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    element.text().collect()
}

/// Text nodes that are direct children of the element.
pub fn own_texts<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}

/// Text before the first child element, if any.
pub fn leading_text<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    element
        .children()
        .next()
        .and_then(|node| node.value().as_text())
        .map(|text| &**text)
}

/// Fails unless the single element at `css` has exactly `expected` as text.
pub fn check_text_content(document: &Html, css: &str, expected: &str) -> Result<()> {
    let element = select_one(document, css)?;
    let found = text_content(element);
    if found != expected {
        return Err(structure(format!(
            "text at {css:?} is {found:?}, expected {expected:?}"
        )));
    }
    Ok(())
}

pub fn remove_prefix<'a>(s: &'a str, prefix: &str) -> Result<&'a str> {
    s.strip_prefix(prefix)
        .ok_or_else(|| structure(format!("{s:?} does not start with {prefix:?}")))
}

pub fn remove_suffix<'a>(s: &'a str, suffix: &str) -> Result<&'a str> {
    s.strip_suffix(suffix)
        .ok_or_else(|| structure(format!("{s:?} does not end with {suffix:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<div id="main"><center><table>
<tr><th>A</th><th>B</th></tr>
<tr><td>1</td><td><font>x</font> y</td></tr>
<tr><td>2</td><td><font>z</font></td></tr>
</table></center>
<form name="p1" method="post"></form><form name="p2"></form>
text one<br>text two</div>
</body></html>"#;

    #[test]
    fn table_rows_sit_under_an_implied_tbody() {
        let document = document_from_string(PAGE);
        let rows = select(&document, "#main > center > table > tbody > tr").unwrap();
        assert_eq!(rows.len(), 3);
        assert!(select(&document, "#main > center > table > tr")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn scope_limits_lookups_to_children() {
        let document = document_from_string(PAGE);
        let row = select_one(&document, "#main tbody > tr:nth-of-type(2)").unwrap();
        assert_eq!(select_from(row, ":scope > td").unwrap().len(), 2);
        assert!(select_from(row, ":scope > font").unwrap().is_empty());
        assert_eq!(select_from(row, "font").unwrap().len(), 1);
    }

    #[test]
    fn select_one_rejects_zero_and_many() {
        let document = document_from_string(PAGE);
        let err = select_one(&document, "#main > form").unwrap_err();
        assert!(err.is_structural());
        let err = select_one(&document, "#missing").unwrap_err();
        assert!(err.to_string().contains("found 0"));

        let form = select_one(&document, r#"#main > form[name="p1"]"#).unwrap();
        assert_eq!(form.value().attr("method"), Some("post"));
    }

    #[test]
    fn bad_selector_is_an_invalid_argument() {
        let document = document_from_string(PAGE);
        let err = select(&document, "tr[").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument(_)));
    }

    #[test]
    fn text_helpers_distinguish_own_leading_and_all_text() {
        let document = document_from_string(PAGE);
        let cell = select_one(
            &document,
            "#main tbody > tr:nth-of-type(2) > td:nth-of-type(2)",
        )
        .unwrap();
        assert_eq!(text_content(cell), "x y");
        assert_eq!(texts(cell), vec!["x", " y"]);
        assert_eq!(own_texts(cell), vec![" y"]);
        assert_eq!(leading_text(cell), None);

        let font = select_one_from(cell, ":scope > font").unwrap();
        assert_eq!(leading_text(font), Some("x"));

        let main = select_one(&document, "#main").unwrap();
        assert_eq!(own_texts(main).last(), Some(&"text two"));
    }

    #[test]
    fn check_text_content_requires_exact_text() {
        let document = document_from_string(PAGE);
        let css = "#main tbody > tr:nth-of-type(1) > th:nth-of-type(2)";
        check_text_content(&document, css, "B").unwrap();
        assert!(check_text_content(&document, css, "B ").is_err());
    }

    #[test]
    fn prefix_and_suffix_must_be_present() {
        assert_eq!(remove_prefix("\n\t    921", "\n\t    ").unwrap(), "921");
        assert_eq!(remove_suffix("01\u{a0}", "\u{a0}").unwrap(), "01");
        assert!(remove_prefix("921", " ").unwrap_err().is_structural());
        assert!(remove_suffix("01", "\u{a0}").unwrap_err().is_structural());
    }

    // 流水號 in Big5
    const BIG5_TEXT: [u8; 6] = [0xac, 0x79, 0xa4, 0xf4, 0xb8, 0xb9];

    fn page_with_head(head: &str) -> Vec<u8> {
        let mut content = format!("<html><head>{head}</head><body><p>").into_bytes();
        content.extend_from_slice(&BIG5_TEXT);
        content.extend_from_slice(b"</p></body></html>");
        content
    }

    fn paragraph(document: &Html) -> String {
        text_content(select_one(document, "p").unwrap())
    }

    #[test]
    fn bytes_are_decoded_with_the_declared_charset() {
        let document = document_from_bytes(&page_with_head(r#"<meta charset="big5">"#));
        assert_eq!(paragraph(&document), "流水號");

        let document = document_from_bytes(&page_with_head(
            r#"<meta http-equiv="Content-Type" content="text/html; charset=Big5">"#,
        ));
        assert_eq!(paragraph(&document), "流水號");
    }

    #[test]
    fn undeclared_bytes_are_utf8() {
        let document = document_from_bytes("<p>流水號</p>".as_bytes());
        assert_eq!(paragraph(&document), "流水號");

        let document = document_from_bytes(&page_with_head(""));
        assert!(paragraph(&document).contains('\u{fffd}'));
    }
}
