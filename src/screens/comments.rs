use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::media::ProfileImage;
use crate::models::Post;
use crate::view::{Pager, PostList, RequestState};

use super::Mounted;

pub struct CommentsScreen {
    client: ApiClient,
    pub post_id: String,
    pub post: RequestState<Post>,
    pub comments: RequestState<PostList>,
    pub pager: Pager,
    /// The viewer's own picture, shown next to the comment box.
    pub picture: Option<ProfileImage>,
}

impl CommentsScreen {
    pub async fn mount(client: ApiClient, post_id: &str) -> ClientResult<Mounted<Self>> {
        if let Err(route) = super::enter(client.session())? {
            return Ok(Mounted::Redirect(route));
        }

        let pager = Pager::new(client.pagination().comments_page_size);
        let mut screen = Self {
            client,
            post_id: post_id.to_string(),
            post: RequestState::Idle,
            comments: RequestState::Idle,
            pager,
            picture: None,
        };
        screen.load().await;
        Ok(Mounted::Ready(screen))
    }

    /// Post and the viewer's picture together, then the comments. Comments
    /// are not requested when the post itself failed to load.
    pub async fn load(&mut self) {
        self.post.begin();
        let (post, picture) = tokio::join!(
            self.client.post(&self.post_id),
            self.client.profile_picture(None),
        );
        let loaded = post.is_ok();
        self.post.finish(post);

        self.picture = match picture {
            Ok(picture) => picture,
            Err(e) => {
                tracing::warn!(post_id = %self.post_id, error = %e, "Failed to load profile picture");
                None
            }
        };

        if loaded {
            self.load_comments().await;
        } else {
            self.comments = RequestState::Idle;
        }
    }

    pub async fn load_comments(&mut self) {
        self.comments.begin();
        let result = self.client.comments(&self.post_id, self.pager.page).await;
        let comments = result.map(|page| {
            self.pager.observe(&page);
            PostList::new(page.items)
        });
        self.comments.finish(comments);
    }

    pub async fn go_to_page(&mut self, page: u32) {
        self.pager.go_to(page);
        self.load_comments().await;
    }

    /// Like a comment or the post itself. Both the comment list and the
    /// main post are updated when the id matches.
    pub async fn like(&mut self, post_id: &str) -> ClientResult<()> {
        self.client.like(post_id).await?;
        if let Some(list) = self.comments.value_mut() {
            list.mark_liked(post_id);
        }
        if let Some(post) = self.post.value_mut().filter(|p| p.id == post_id) {
            post.mark_liked();
        }
        Ok(())
    }

    pub async fn unlike(&mut self, post_id: &str) -> ClientResult<()> {
        self.client.unlike(post_id).await?;
        if let Some(list) = self.comments.value_mut() {
            list.mark_unliked(post_id);
        }
        if let Some(post) = self.post.value_mut().filter(|p| p.id == post_id) {
            post.mark_unliked();
        }
        Ok(())
    }

    /// Add a comment and reload the current page of comments.
    pub async fn comment(&mut self, text: &str) -> ClientResult<()> {
        self.client.comment(&self.post_id, text).await?;
        self.load_comments().await;
        Ok(())
    }
}
