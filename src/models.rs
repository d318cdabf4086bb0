use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// -- Accounts --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            "other" => Ok(Sex::Other),
            other => Err(format!(
                "unknown sex '{}', expected male, female or other",
                other
            )),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub sex: Sex,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Older servers only return the token.
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UserIdResponse {
    pub user_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserDetail {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_joined: Option<String>,
    /// Free-form as stored server-side; may be blank.
    pub sex: Option<String>,
}

impl UserDetail {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

// -- Posts --

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostContent {
    pub text: String,
    #[serde(default)]
    pub media: Vec<String>,
}

/// A post or a comment; the API serves both with the same shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    pub content: PostContent,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub likes: Vec<i64>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    /// Search hits carry highlighted fragments keyed by field.
    #[serde(default)]
    pub highlight: HashMap<String, Vec<String>>,
}

pub type Comment = Post;

impl Post {
    pub fn comment_count(&self) -> u64 {
        self.comment_count
            .unwrap_or(self.comments.len() as u64)
    }

    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }

    /// Local view update after the server accepted a like.
    pub fn mark_liked(&mut self) {
        self.is_liked = true;
        self.like_count += 1;
    }

    /// Local view update after the server accepted an unlike.
    pub fn mark_unliked(&mut self) {
        self.is_liked = false;
        self.like_count = self.like_count.saturating_sub(1);
    }
}

/// Body for creating a post or a comment.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub content: PostContent,
    pub comments: Vec<String>,
    pub likes: Vec<i64>,
}

impl NewPost {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: PostContent {
                text: text.into(),
                media: Vec::new(),
            },
            comments: Vec::new(),
            likes: Vec::new(),
        }
    }

    pub fn with_media(mut self, media: Vec<String>) -> Self {
        self.content.media = media;
        self
    }
}

// -- Settings --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Friends,
    Private,
}

impl FromStr for ProfileVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(ProfileVisibility::Public),
            "friends" => Ok(ProfileVisibility::Friends),
            "private" => Ok(ProfileVisibility::Private),
            other => Err(format!(
                "unknown visibility '{}', expected public, friends or private",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub user: SettingsUser,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub show_email: bool,
    #[serde(default)]
    pub profile_visibility: ProfileVisibility,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SettingsUserUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}

/// Partial settings update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SettingsUserUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_visibility: Option<ProfileVisibility>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.user.as_ref().map_or(true, SettingsUserUpdate::is_empty)
            && self.sex.is_none()
            && self.timezone.is_none()
            && self.show_email.is_none()
            && self.profile_visibility.is_none()
    }
}

// -- Search --

/// Page size the search endpoint uses when the response does not say.
pub const SEARCH_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<Post>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub has_next: Option<bool>,
    #[serde(default)]
    pub query: Option<String>,
}

impl SearchResults {
    pub fn total_pages(&self) -> u32 {
        let size = self.page_size.filter(|&s| s > 0).unwrap_or(SEARCH_PAGE_SIZE);
        crate::api::envelope::total_pages(Some(self.total), size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(is_liked: bool, like_count: u64) -> Post {
        serde_json::from_value(json!({
            "_id": "p1",
            "content": { "text": "hello" },
            "is_liked": is_liked,
            "like_count": like_count,
        }))
        .unwrap()
    }

    #[test]
    fn like_increments_and_sets_flag() {
        let mut p = post(false, 5);
        p.mark_liked();
        assert!(p.is_liked);
        assert_eq!(p.like_count, 6);
    }

    #[test]
    fn unlike_is_the_inverse() {
        let mut p = post(true, 6);
        p.mark_unliked();
        assert!(!p.is_liked);
        assert_eq!(p.like_count, 5);
    }

    #[test]
    fn unlike_never_goes_negative() {
        let mut p = post(true, 0);
        p.mark_unliked();
        assert_eq!(p.like_count, 0);
    }

    #[test]
    fn post_accepts_mongo_style_id() {
        let p = post(false, 0);
        assert_eq!(p.id, "p1");
        assert!(p.content.media.is_empty());
    }

    #[test]
    fn comment_count_falls_back_to_comment_ids() {
        let p: Post = serde_json::from_value(json!({
            "id": "p2",
            "content": { "text": "x", "media": ["http://img/1.png"] },
            "comments": ["c1", "c2"],
        }))
        .unwrap();
        assert_eq!(p.comment_count(), 2);
        assert_eq!(p.content.media.len(), 1);
    }

    #[test]
    fn created_at_parses_rfc3339() {
        let p: Post = serde_json::from_value(json!({
            "id": "p3",
            "content": { "text": "x" },
            "created_at": "2025-03-01T12:00:00Z",
        }))
        .unwrap();
        assert!(p.created_at().is_some());
    }

    #[test]
    fn settings_decode_nested_user() {
        let s: Settings = serde_json::from_value(json!({
            "user": { "username": "alice", "email": "a@b.c" },
            "sex": "female",
            "timezone": "Europe/Lisbon",
            "show_email": true,
            "profile_visibility": "friends",
        }))
        .unwrap();
        assert_eq!(s.user.username, "alice");
        assert_eq!(s.sex.as_deref(), Some("female"));
        assert_eq!(s.profile_visibility, ProfileVisibility::Friends);
    }

    #[test]
    fn settings_update_skips_unset_fields() {
        let update = SettingsUpdate {
            timezone: Some("UTC".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "timezone": "UTC" })
        );
        assert!(!update.is_empty());
        assert!(SettingsUpdate::default().is_empty());
    }

    #[test]
    fn sex_parses_case_insensitively() {
        assert_eq!("Female".parse::<Sex>().unwrap(), Sex::Female);
        assert!("robot".parse::<Sex>().is_err());
    }

    #[test]
    fn search_total_pages_uses_server_page_size() {
        let results: SearchResults = serde_json::from_value(json!({
            "results": [],
            "total": 21,
            "page": 1,
            "page_size": 10,
            "has_next": true,
        }))
        .unwrap();
        assert_eq!(results.total_pages(), 3);
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let user = UserDetail {
            username: "alice".into(),
            ..Default::default()
        };
        assert_eq!(user.display_name(), "alice");
    }
}
