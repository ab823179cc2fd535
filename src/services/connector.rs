//! Search connector: adapts search-UI state to the backend search contract.
//!
//! Any failure degrades to an empty page. Callers always receive a
//! well-formed [`SearchResponsePage`] and never an error.

use serde::Serialize;
use tracing::{debug, warn};

use super::debounce::Debouncer;
use crate::api::GrimoireApi;
use crate::models::{
    Filter, FilterType, ResultRecord, SearchRequest, SearchResponsePage, Sort, SortDirection,
};

/// Search state as kept by the search UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub search_term: String,
    pub filters: Vec<Filter>,
    /// 1-based page index.
    pub current: u32,
    pub results_per_page: u32,
    pub sort_list: Vec<Sort>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            filters: Vec::new(),
            current: 1,
            results_per_page: 20,
            sort_list: Vec::new(),
        }
    }
}

impl SearchState {
    pub fn with_term(term: impl Into<String>) -> Self {
        Self {
            search_term: term.into(),
            ..Default::default()
        }
    }

    /// Add a value to the filter on `field`, creating the filter if needed.
    /// Values already present are not repeated.
    pub fn add_filter_value(&mut self, field: &str, value: &str) {
        match self.filters.iter().position(|f| f.field == field) {
            Some(i) => {
                let values = &mut self.filters[i].values;
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
            None => self.filters.push(Filter {
                field: field.to_string(),
                values: vec![value.to_string()],
                filter_type: FilterType::All,
            }),
        }
    }

    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            search_term: self.search_term.clone(),
            filters: self.filters.clone(),
            current: self.current.max(1),
            results_per_page: self.results_per_page,
            sort: self.sort_list.clone(),
        }
    }
}

/// A result field and the snippet length requested for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultField {
    pub name: String,
    pub snippet_size: Option<u32>,
}

/// Field configuration handed to the connector alongside the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub search_fields: Vec<String>,
    pub result_fields: Vec<ResultField>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let field = |name: &str, snippet_size: Option<u32>| ResultField {
            name: name.to_string(),
            snippet_size,
        };
        Self {
            search_fields: vec![
                "fileName".to_string(),
                "extractedText".to_string(),
                "summary".to_string(),
            ],
            result_fields: vec![
                field("fileName", Some(100)),
                field("summary", Some(200)),
                field("fileType", None),
                field("fileSize", None),
                field("uploadDate", None),
                field("category", None),
            ],
        }
    }
}

/// A selectable sort order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    pub name: &'static str,
    /// `None` means relevance order (empty sort list).
    pub sort: Option<(&'static str, SortDirection)>,
}

impl SortOption {
    pub fn defaults() -> Vec<SortOption> {
        vec![
            SortOption {
                name: "Relevance",
                sort: None,
            },
            SortOption {
                name: "Title (A-Z)",
                sort: Some(("title", SortDirection::Asc)),
            },
            SortOption {
                name: "Title (Z-A)",
                sort: Some(("title", SortDirection::Desc)),
            },
            SortOption {
                name: "Date (Newest)",
                sort: Some(("uploadDate", SortDirection::Desc)),
            },
            SortOption {
                name: "Date (Oldest)",
                sort: Some(("uploadDate", SortDirection::Asc)),
            },
        ]
    }

    pub fn sort_list(&self) -> Vec<Sort> {
        self.sort
            .map(|(field, direction)| Sort {
                field: field.to_string(),
                direction,
            })
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutocompleteResponse {
    pub autocompleted_results: Vec<ResultRecord>,
}

pub struct SearchConnector<'a> {
    api: &'a dyn GrimoireApi,
}

impl<'a> SearchConnector<'a> {
    pub fn new(api: &'a dyn GrimoireApi) -> Self {
        Self { api }
    }

    pub async fn on_search(&self, state: &SearchState, config: &QueryConfig) -> SearchResponsePage {
        debug!(
            "Searching {:?} over {} field(s), page {}",
            state.search_term,
            config.search_fields.len(),
            state.current
        );
        match self.api.search(&state.to_request()).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Search error: {}", e);
                SearchResponsePage::empty()
            }
        }
    }

    /// Suggestions reuse the full search.
    pub async fn on_autocomplete(
        &self,
        state: &SearchState,
        config: &QueryConfig,
    ) -> AutocompleteResponse {
        let page = self.on_search(state, config).await;
        AutocompleteResponse {
            autocompleted_results: page.results,
        }
    }

    /// Search only if no newer keystroke arrives within the debounce delay.
    pub async fn on_search_debounced(
        &self,
        debouncer: &Debouncer,
        state: &SearchState,
        config: &QueryConfig,
    ) -> Option<SearchResponsePage> {
        if !debouncer.settle().await {
            return None;
        }
        Some(self.on_search(state, config).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_clamps_page_to_one() {
        let state = SearchState {
            current: 0,
            ..SearchState::with_term("memo")
        };
        let request = state.to_request();
        assert_eq!(request.current, 1);
        assert_eq!(request.search_term, "memo");
    }

    #[test]
    fn test_filter_values_merge_per_field() {
        let mut state = SearchState::with_term("memo");
        state.add_filter_value("fileType", "pdf");
        state.add_filter_value("fileType", "docx");
        state.add_filter_value("fileType", "pdf");
        state.add_filter_value("category", "legal");

        assert_eq!(state.filters.len(), 2);
        assert_eq!(state.filters[0].values, vec!["pdf", "docx"]);
        assert_eq!(state.filters[0].filter_type, FilterType::All);
        assert_eq!(state.filters[1].field, "category");
    }

    #[test]
    fn test_relevance_sort_is_empty() {
        let options = SortOption::defaults();
        assert!(options[0].sort_list().is_empty());
        assert_eq!(
            options[3].sort_list(),
            vec![Sort {
                field: "uploadDate".to_string(),
                direction: SortDirection::Desc,
            }]
        );
    }

    #[test]
    fn test_default_query_config_snippets() {
        let config = QueryConfig::default();
        let summary = config
            .result_fields
            .iter()
            .find(|f| f.name == "summary")
            .unwrap();
        assert_eq!(summary.snippet_size, Some(200));
    }
}
