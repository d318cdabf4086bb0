use reqwest::Method;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::SearchResults;
use crate::validation::FieldErrors;

impl ApiClient {
    /// GET /api/search/?q=&page=
    ///
    /// The query is passed through untouched; only a blank one is refused locally.
    pub async fn search(&self, query: &str, page: u32) -> ClientResult<SearchResults> {
        if query.trim().is_empty() {
            let mut errors = FieldErrors::default();
            errors.insert("q", "Query parameter \"q\" is required");
            errors.into_result()?;
        }

        let url = self.endpoint(&["api", "search"])?;
        let req = self
            .with_session(Method::GET, url)?
            .query(&[("q", query)])
            .query(&[("page", page)]);
        self.json(req).await
    }
}
