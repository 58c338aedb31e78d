//! Page-number pagination for list responses

use std::collections::BTreeMap;
use std::ops::Range;

use serde_json::{json, Value};

use crate::error::{AdminError, AdminResult};

pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "page_size";

/// One page of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub num_pages: usize,
    pub size: usize,
    pub count: usize,
}

impl Page {
    /// Select the requested page of `count` items
    ///
    /// `requested` is the raw `page` parameter; `last` selects the final
    /// page. An empty result set still has one page.
    pub fn select(count: usize, size: usize, requested: Option<&str>) -> AdminResult<Self> {
        let size = size.max(1);
        let num_pages = count.div_ceil(size).max(1);

        let number = match requested {
            None => 1,
            Some("last") => num_pages,
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid_page(raw))?,
        };

        if number == 0 || number > num_pages {
            return Err(invalid_page(&number.to_string()));
        }

        Ok(Self {
            number,
            num_pages,
            size,
            count,
        })
    }

    pub fn range(&self) -> Range<usize> {
        let start = (self.number - 1) * self.size;
        start.min(self.count)..(start + self.size).min(self.count)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    /// Wrap rendered results in the `{count, next, previous, results}`
    /// envelope
    pub fn envelope(
        &self,
        path: &str,
        query: &BTreeMap<String, String>,
        results: Vec<Value>,
    ) -> Value {
        let next = self
            .has_next()
            .then(|| page_link(path, query, Some(self.number + 1)));
        let previous = self.has_previous().then(|| {
            if self.number == 2 {
                page_link(path, query, None)
            } else {
                page_link(path, query, Some(self.number - 1))
            }
        });

        json!({
            "count": self.count,
            "next": next,
            "previous": previous,
            "results": results,
        })
    }
}

fn invalid_page(raw: &str) -> AdminError {
    AdminError::NotFound {
        entity_type: "Page".into(),
        identifier: raw.to_string(),
    }
}

/// Link to a page, keeping other query parameters; `None` drops `page`
fn page_link(path: &str, query: &BTreeMap<String, String>, page: Option<usize>) -> String {
    let mut params = query.clone();
    match page {
        Some(number) => {
            params.insert(PAGE_PARAM.to_string(), number.to_string());
        }
        None => {
            params.remove(PAGE_PARAM);
        }
    }

    if params.is_empty() {
        return path.to_string();
    }

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&params)
        .finish();
    format!("{}?{}", path, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_first_page() {
        let page = Page::select(25, 10, None).unwrap();
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 3);
        assert_eq!(page.range(), 0..10);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_select_last_page() {
        let page = Page::select(25, 10, Some("last")).unwrap();
        assert_eq!(page.number, 3);
        assert_eq!(page.range(), 20..25);
        assert!(!page.has_next());
    }

    #[test]
    fn test_empty_set_has_one_page() {
        let page = Page::select(0, 10, Some("1")).unwrap();
        assert_eq!(page.range(), 0..0);
    }

    #[test]
    fn test_invalid_page() {
        assert!(Page::select(5, 10, Some("2")).unwrap_err().is_not_found());
        assert!(Page::select(5, 10, Some("0")).unwrap_err().is_not_found());
        assert!(Page::select(5, 10, Some("abc")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_envelope_links() {
        let mut query = BTreeMap::new();
        query.insert("page".to_string(), "2".to_string());
        query.insert("active".to_string(), "true".to_string());

        let page = Page::select(25, 10, Some("2")).unwrap();
        let body = page.envelope("/api/widget/", &query, vec![]);

        assert_eq!(body["count"], json!(25));
        assert_eq!(body["next"], json!("/api/widget/?active=true&page=3"));
        assert_eq!(body["previous"], json!("/api/widget/?active=true"));
    }

    #[test]
    fn test_links_encode_filter_values() {
        let mut query = BTreeMap::new();
        query.insert("name".to_string(), "nuts & bolts=1".to_string());

        let page = Page::select(25, 10, None).unwrap();
        let body = page.envelope("/api/widget/", &query, vec![]);

        let next = body["next"].as_str().unwrap();
        assert_eq!(next, "/api/widget/?name=nuts+%26+bolts%3D1&page=2");

        let request = crate::http::Request::get(next);
        assert_eq!(request.query_param("name"), Some("nuts & bolts=1"));
        assert_eq!(request.query_param("page"), Some("2"));
    }
}
