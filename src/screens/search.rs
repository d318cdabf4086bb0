use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::SearchResults;
use crate::view::RequestState;

pub struct SearchScreen {
    client: ApiClient,
    pub query: String,
    pub page: u32,
    pub results: RequestState<SearchResults>,
}

impl SearchScreen {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            query: String::new(),
            page: 1,
            results: RequestState::Idle,
        }
    }

    /// New query, starting from the first page.
    pub async fn search(&mut self, query: &str) {
        self.query = query.trim().to_string();
        self.page = 1;
        self.run().await;
    }

    pub async fn go_to_page(&mut self, page: u32) {
        let last = self.total_pages();
        self.page = page.clamp(1, last);
        self.run().await;
    }

    pub fn total_pages(&self) -> u32 {
        self.results
            .value()
            .map(SearchResults::total_pages)
            .unwrap_or(1)
    }

    async fn run(&mut self) {
        self.results.begin();
        let result: ClientResult<SearchResults> = self.client.search(&self.query, self.page).await;
        self.results.finish(result);
    }
}
