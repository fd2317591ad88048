//! Keeps only the content regions needed downstream

use crate::error::{Error, Result};
use scraper::{ElementRef, Html};

/// Selects `div` elements by class and concatenates their outer HTML
#[derive(Debug, Clone, Default)]
pub struct FragmentFilter {
    classes: Vec<String>,
}

impl FragmentFilter {
    /// Keep `div`s carrying any of `classes`; an empty list keeps the page as is
    ///
    /// Each entry is a single class name, matched literally.
    pub fn new<S: AsRef<str>>(classes: &[S]) -> Result<Self> {
        let classes = classes
            .iter()
            .map(|class| {
                let class = class.as_ref().trim();
                if class.is_empty() || class.contains(char::is_whitespace) {
                    Err(Error::InvalidClass(class.to_string()))
                } else {
                    Ok(class.to_string())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { classes })
    }

    fn matches(&self, element: &ElementRef) -> bool {
        let element = element.value();
        element.name() == "div"
            && element
                .classes()
                .any(|class| self.classes.iter().any(|wanted| wanted == class))
    }

    /// Matching regions in document order; nested matches are kept once, inside their parent
    pub fn apply(&self, html: &str) -> String {
        if self.classes.is_empty() {
            return html.to_string();
        }

        let doc = Html::parse_document(html);
        doc.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| self.matches(element))
            .filter(|element| {
                !element
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|ancestor| self.matches(&ancestor))
            })
            .map(|element| element.html())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<html><body>
<div class="header">menu</div>
<div class="tm-article-author"><a href="/u/alice">alice</a></div>
<div class="tm-article-presenter__body wide"><p>Body</p><div class="tm-article-author">inner</div></div>
<div class="comments">noise</div>
</body></html>"#;

    fn article_filter() -> FragmentFilter {
        FragmentFilter::new(&["tm-article-presenter__body", "tm-article-author"]).unwrap()
    }

    #[test]
    fn test_apply_keeps_named_regions() {
        let filtered = article_filter().apply(ARTICLE);
        assert!(filtered.contains("alice"));
        assert!(filtered.contains("<p>Body</p>"));
        assert!(!filtered.contains("menu"));
        assert!(!filtered.contains("noise"));
    }

    #[test]
    fn test_apply_keeps_document_order_without_duplicates() {
        let filtered = article_filter().apply(ARTICLE);
        let author = filtered.find("alice").unwrap();
        let body = filtered.find("Body").unwrap();
        assert!(author < body);
        assert_eq!(filtered.matches("inner").count(), 1);
    }

    #[test]
    fn test_apply_without_matches_is_empty() {
        assert_eq!(article_filter().apply("<html><body><p>x</p></body></html>"), "");
    }

    #[test]
    fn test_empty_class_list_keeps_page() {
        let filter = FragmentFilter::new::<&str>(&[]).unwrap();
        assert_eq!(filter.apply(ARTICLE), ARTICLE);
    }

    #[test]
    fn test_invalid_class_is_rejected() {
        assert!(matches!(
            FragmentFilter::new(&["two words"]),
            Err(Error::InvalidClass(class)) if class == "two words"
        ));
        assert!(FragmentFilter::new(&["ok", "  "]).is_err());
    }

    #[test]
    fn test_class_is_matched_literally() {
        let filter = FragmentFilter::new(&["odd[class"]).unwrap();
        let html = r#"<div class="odd[class">kept</div><div class="odd">dropped</div>"#;
        assert_eq!(filter.apply(html), r#"<div class="odd[class">kept</div>"#);
    }

    #[test]
    fn test_only_div_elements_match() {
        let filter = FragmentFilter::new(&["keep"]).unwrap();
        let html = r#"<span class="keep">no</span><div class="keep">yes</div>"#;
        assert_eq!(filter.apply(html), r#"<div class="keep">yes</div>"#);
    }
}
