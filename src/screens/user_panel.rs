use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::media::ProfileImage;
use crate::models::{NewPost, Settings, UserDetail};
use crate::session::Route;
use crate::validation::FieldErrors;
use crate::view::{Pager, PostList, RequestState};

use super::Mounted;

pub struct UserPanel {
    client: ApiClient,
    pub username: String,
    pub user: RequestState<UserDetail>,
    pub settings: RequestState<Settings>,
    pub posts: RequestState<PostList>,
    pub pager: Pager,
    pub picture: Option<ProfileImage>,
}

impl UserPanel {
    /// Mount for `username`, or for the session's own user when `None`.
    pub async fn mount(client: ApiClient, username: Option<&str>) -> ClientResult<Mounted<Self>> {
        let auth = match super::enter(client.session())? {
            Ok(auth) => auth,
            Err(route) => return Ok(Mounted::Redirect(route)),
        };

        let Some(username) = super::target_username(username, &auth) else {
            let mut errors = FieldErrors::default();
            errors.insert("username", "Failed to identify user. Please login again.");
            return Err(ClientError::Validation(errors));
        };

        let pager = Pager::new(client.pagination().user_posts_page_size);
        let mut panel = Self {
            client,
            username,
            user: RequestState::Idle,
            settings: RequestState::Idle,
            posts: RequestState::Idle,
            pager,
            picture: None,
        };
        panel.refresh().await;
        Ok(Mounted::Ready(panel))
    }

    pub fn is_own_profile(&self) -> bool {
        matches!(self.client.session().username(), Ok(Some(own)) if own == self.username)
    }

    /// Load everything the page shows, concurrently. Each section fails on
    /// its own; a missing picture is never an error.
    pub async fn refresh(&mut self) {
        self.user.begin();
        self.settings.begin();
        self.posts.begin();

        let client = &self.client;
        let username = self.username.as_str();
        let (user, settings, posts, picture) = tokio::join!(
            client.user_detail(username),
            client.settings(username),
            client.user_posts(self.pager.page, self.pager.page_size),
            client.profile_picture_for(username),
        );

        self.user.finish(user);
        self.settings.finish(settings);

        let posts = posts.map(|page| {
            self.pager.observe(&page);
            PostList::new(page.items)
        });
        self.posts.finish(posts);

        self.picture = match picture {
            Ok(picture) => picture,
            Err(e) => {
                tracing::warn!(username = %self.username, error = %e, "Failed to load profile picture");
                None
            }
        };
    }

    pub async fn load_posts(&mut self) {
        self.posts.begin();
        let result = self
            .client
            .user_posts(self.pager.page, self.pager.page_size)
            .await;
        let posts = result.map(|page| {
            self.pager.observe(&page);
            PostList::new(page.items)
        });
        self.posts.finish(posts);
    }

    pub async fn go_to_page(&mut self, page: u32) {
        self.pager.go_to(page);
        self.load_posts().await;
    }

    /// Like on the server, then reflect it locally. A failed call leaves the list as it was.
    pub async fn like(&mut self, post_id: &str) -> ClientResult<()> {
        self.client.like(post_id).await?;
        if let Some(list) = self.posts.value_mut() {
            list.mark_liked(post_id);
        }
        Ok(())
    }

    pub async fn unlike(&mut self, post_id: &str) -> ClientResult<()> {
        self.client.unlike(post_id).await?;
        if let Some(list) = self.posts.value_mut() {
            list.mark_unliked(post_id);
        }
        Ok(())
    }

    /// Like or unlike depending on what the list currently shows.
    pub async fn toggle_like(&mut self, post_id: &str) -> ClientResult<()> {
        let liked = self
            .posts
            .value()
            .and_then(|list| list.get(post_id))
            .is_some_and(|post| post.is_liked);
        if liked {
            self.unlike(post_id).await
        } else {
            self.like(post_id).await
        }
    }

    /// Publish a post and reload the current page so it shows up.
    pub async fn create_post(&mut self, text: &str) -> ClientResult<()> {
        self.client.create_post(&NewPost::text(text)).await?;
        self.load_posts().await;
        Ok(())
    }

    pub fn logout(self) -> ClientResult<Route> {
        self.client.logout()?;
        Ok(Route::Login)
    }
}
