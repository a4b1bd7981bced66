pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// True when `text` would not produce a search (empty or only whitespace).
pub fn is_blank_query(text: &str) -> bool {
    text.trim().is_empty()
}

#[derive(Clone, Eq, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
    pub token: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, token: Option<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
            token,
        }
    }

    /// Token to send as `Authorization: Bearer`, ignoring empty strings.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

impl std::fmt::Debug for SearchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchRequest")
            .field("query", &self.query)
            .field("max_results", &self.max_results)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchResultItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
}

/// Ordered results of one search, in the order the backend returned them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResultList {
    items: Vec<SearchResultItem>,
}

impl ResultList {
    pub fn new(items: Vec<SearchResultItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[SearchResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResultItem> {
        self.items.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }
}

impl FromIterator<SearchResultItem> for ResultList {
    fn from_iter<I: IntoIterator<Item = SearchResultItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for ResultList {
    type Item = SearchResultItem;
    type IntoIter = std::vec::IntoIter<SearchResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultList {
    type Item = &'a SearchResultItem;
    type IntoIter = std::slice::Iter<'a, SearchResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_queries_are_detected() {
        assert!(is_blank_query(""));
        assert!(is_blank_query("   \t\n"));
        assert!(!is_blank_query(" lofi "));
    }

    #[test]
    fn new_request_uses_default_max_results() {
        let request = SearchRequest::new("rust", None);
        assert_eq!(request.max_results, 5);
        assert_eq!(request.bearer_token(), None);
    }

    #[test]
    fn empty_token_is_not_a_bearer_token() {
        let request = SearchRequest::new("rust", Some(String::new()));
        assert_eq!(request.bearer_token(), None);
    }

    #[test]
    fn debug_output_redacts_token() {
        let request = SearchRequest::new("rust", Some("secret-token".to_string()));
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
