use reqwest::Method;

use crate::api::{ApiClient, Page};
use crate::error::ClientResult;
use crate::models::{Comment, NewPost, Post};
use crate::validation;

impl ApiClient {
    /// GET /api/posts/?page=&page_size=[&search=]
    ///
    /// Listing is public; the token goes along when present so `is_liked` is filled in.
    pub async fn list_posts(
        &self,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> ClientResult<Page<Post>> {
        let url = self.endpoint(&["api", "posts"])?;
        let mut req = self
            .with_session(Method::GET, url)?
            .query(&[("page", page), ("page_size", page_size)]);
        if let Some(q) = search.map(str::trim).filter(|q| !q.is_empty()) {
            req = req.query(&[("search", q)]);
        }
        self.json(req).await
    }

    /// POST /api/posts/
    pub async fn create_post(&self, post: &NewPost) -> ClientResult<()> {
        validation::validate_text("text", &post.content.text)?;
        let url = self.endpoint(&["api", "posts"])?;
        self.discard(self.authed(Method::POST, url)?.json(post)).await
    }

    /// GET /api/posts/{id}/
    pub async fn post(&self, post_id: &str) -> ClientResult<Post> {
        let url = self.endpoint(&["api", "posts", post_id])?;
        self.json(self.authed(Method::GET, url)?).await
    }

    /// DELETE /api/posts/{id}/
    pub async fn delete_post(&self, post_id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["api", "posts", post_id])?;
        self.discard(self.authed(Method::DELETE, url)?).await
    }

    /// POST /api/posts/{id}/like/
    pub async fn like(&self, post_id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["api", "posts", post_id, "like"])?;
        self.discard(self.authed(Method::POST, url)?).await
    }

    /// POST /api/posts/{id}/unlike/
    pub async fn unlike(&self, post_id: &str) -> ClientResult<()> {
        let url = self.endpoint(&["api", "posts", post_id, "unlike"])?;
        self.discard(self.authed(Method::POST, url)?).await
    }

    /// POST /api/posts/{id}/comment/
    pub async fn comment(&self, post_id: &str, text: &str) -> ClientResult<()> {
        validation::validate_text("text", text)?;
        let url = self.endpoint(&["api", "posts", post_id, "comment"])?;
        let body = NewPost::text(text);
        self.discard(self.authed(Method::POST, url)?.json(&body)).await
    }

    /// GET /api/posts/{id}/comments/?page=
    pub async fn comments(&self, post_id: &str, page: u32) -> ClientResult<Page<Comment>> {
        let url = self.endpoint(&["api", "posts", post_id, "comments"])?;
        let req = self.authed(Method::GET, url)?.query(&[("page", page)]);
        self.json(req).await
    }

    /// GET /api/posts/user/?page=&page_size=
    pub async fn user_posts(&self, page: u32, page_size: u32) -> ClientResult<Page<Post>> {
        let url = self.endpoint(&["api", "posts", "user"])?;
        let req = self
            .authed(Method::GET, url)?
            .query(&[("page", page), ("page_size", page_size)]);
        self.json(req).await
    }
}
