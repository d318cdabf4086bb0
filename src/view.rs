use crate::api::Page;
use crate::error::ClientResult;
use crate::models::Post;

/// Lifecycle of one request as a screen sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    /// User-facing message; the error itself is logged where it happened.
    Error(String),
}

impl<T> RequestState<T> {
    pub fn begin(&mut self) {
        *self = RequestState::Loading;
    }

    pub fn finish(&mut self, result: ClientResult<T>) {
        *self = match result {
            Ok(value) => RequestState::Success(value),
            Err(e) => RequestState::Error(e.user_message()),
        };
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            RequestState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            RequestState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// 1-based page counter bounded by the last known page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            total_pages: 1,
            page_size,
        }
    }

    /// Jump to `page`, clamped to the known range.
    pub fn go_to(&mut self, page: u32) -> u32 {
        self.page = page.clamp(1, self.total_pages.max(1));
        self.page
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Take the page count from a response. A response without a count
    /// leaves the previous value.
    pub fn observe<T>(&mut self, page: &Page<T>) {
        if page.count.is_some_and(|c| c > 0) {
            self.total_pages = page.total_pages(self.page_size);
        }
    }
}

/// Posts shown on a screen, with the local like/unlike updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostList {
    pub posts: Vec<Post>,
}

impl PostList {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    /// Returns false when the post is not on this list.
    pub fn mark_liked(&mut self, post_id: &str) -> bool {
        self.update(post_id, Post::mark_liked)
    }

    pub fn mark_unliked(&mut self, post_id: &str) -> bool {
        self.update(post_id, Post::mark_unliked)
    }

    fn update(&mut self, post_id: &str, apply: fn(&mut Post)) -> bool {
        match self.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                apply(post);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use serde_json::json;

    fn post(id: &str, is_liked: bool, like_count: u64) -> Post {
        serde_json::from_value(json!({
            "_id": id,
            "content": { "text": "t" },
            "is_liked": is_liked,
            "like_count": like_count,
        }))
        .unwrap()
    }

    #[test]
    fn request_state_transitions() {
        let mut state: RequestState<u32> = RequestState::default();
        assert_eq!(state, RequestState::Idle);

        state.begin();
        assert!(state.is_loading());

        state.finish(Ok(7));
        assert_eq!(state.value(), Some(&7));

        state.begin();
        state.finish(Err(ClientError::NotAuthenticated));
        assert_eq!(state.error(), Some("User not authenticated"));
        assert_eq!(state.value(), None);
    }

    #[test]
    fn pager_follows_count() {
        let mut pager = Pager::new(7);
        let page: Page<u32> =
            serde_json::from_value(json!({ "results": [1, 2, 3, 4, 5, 6, 7], "count": 23 }))
                .unwrap();
        pager.observe(&page);
        assert_eq!(pager.total_pages, 4);
        assert!(pager.has_next());
        assert_eq!(pager.go_to(9), 4);
        assert!(!pager.has_next());
        assert!(pager.has_prev());
        assert_eq!(pager.go_to(0), 1);
    }

    #[test]
    fn pager_ignores_uncounted_pages() {
        let mut pager = Pager::new(5);
        pager.total_pages = 3;
        let bare: Page<u32> = serde_json::from_value(json!([1, 2])).unwrap();
        pager.observe(&bare);
        assert_eq!(pager.total_pages, 3);
    }

    #[test]
    fn like_touches_only_the_matching_post() {
        let mut list = PostList::new(vec![post("a", false, 5), post("b", false, 1)]);
        assert!(list.mark_liked("a"));

        let a = list.get("a").unwrap();
        assert!(a.is_liked);
        assert_eq!(a.like_count, 6);
        assert_eq!(list.get("b").unwrap().like_count, 1);

        assert!(!list.mark_liked("missing"));
    }

    #[test]
    fn unlike_reverses_like() {
        let mut list = PostList::new(vec![post("a", true, 6)]);
        list.mark_unliked("a");
        let a = list.get("a").unwrap();
        assert!(!a.is_liked);
        assert_eq!(a.like_count, 5);
    }
}
