//! HTML to readable text

use scraper::{ElementRef, Html, Node};

/// Elements whose content is boilerplate rather than readable text
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "noscript", "template",
];

/// Strip an HTML document down to its readable text
///
/// Boilerplate elements are dropped first; the remaining text nodes are
/// trimmed and joined with single spaces.
#[must_use]
pub fn strip_html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    collect_text(document.root_element(), &mut parts);
    parts.join(" ")
}

fn collect_text<'a>(element: ElementRef<'a>, parts: &mut Vec<&'a str>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
            Node::Element(el) => {
                if SKIPPED_ELEMENTS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(child_ref, parts);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_boilerplate_elements() {
        let html = r"
            <!DOCTYPE html>
            <html>
            <head><title>Page</title><style>body { color: red; }</style></head>
            <body>
                <header>Site header</header>
                <nav>Home | About</nav>
                <article>
                    <h1>Main Title</h1>
                    <p>First paragraph.</p>
                    <script>var x = 1;</script>
                    <p>Second   paragraph.</p>
                </article>
                <footer>Copyright</footer>
            </body>
            </html>
        ";

        let text = strip_html_to_text(html);
        assert!(text.contains("Main Title"));
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second   paragraph."));
        assert!(!text.contains("Site header"));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_joins_nodes_with_single_space() {
        let text = strip_html_to_text("<p>Hello</p><p>world</p>");
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(strip_html_to_text(""), "");
    }
}
