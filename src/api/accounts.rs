use std::path::Path;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::media::{self, ProfileImage};
use crate::models::{
    LoginRequest, LoginResponse, SignupRequest, SignupResponse, UserDetail, UserIdResponse,
};
use crate::validation;

/// Multipart field the profile-picture endpoints read the file from.
pub const PROFILE_PICTURE_FIELD: &str = "profile_picture";

impl ApiClient {
    /// POST /api/accounts/signup/
    pub async fn signup(&self, req: &SignupRequest) -> ClientResult<SignupResponse> {
        validation::validate_signup(req)?;
        let url = self.endpoint(&["api", "accounts", "signup"])?;
        self.json(self.public(Method::POST, url).json(req)).await
    }

    /// POST /api/accounts/login/ and persist the returned token.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let req = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        validation::validate_login(&req)?;

        let url = self.endpoint(&["api", "accounts", "login"])?;
        let resp: LoginResponse = self.json(self.public(Method::POST, url).json(&req)).await?;

        let name = resp.username.as_deref().unwrap_or(&req.username);
        self.session.login(&resp.token, Some(name))?;
        Ok(resp)
    }

    /// Local only: the server keeps no per-client session to end.
    pub fn logout(&self) -> ClientResult<()> {
        self.session.logout()
    }

    /// GET /api/accounts/user-id/?username=
    pub async fn user_id(&self, username: &str) -> ClientResult<i64> {
        let url = self.endpoint(&["api", "accounts", "user-id"])?;
        let req = self
            .authed(Method::GET, url)?
            .query(&[("username", username)]);
        let resp: UserIdResponse = self.json(req).await?;
        Ok(resp.user_id)
    }

    /// GET /api/user/{username}/
    pub async fn user_detail(&self, username: &str) -> ClientResult<UserDetail> {
        let url = self.endpoint(&["api", "user", username])?;
        self.json(self.authed(Method::GET, url)?).await
    }

    /// GET /api/accounts/profile/[?id=]
    ///
    /// `None` for the current user. A 404 means there is no picture and is
    /// not an error; neither is a 2xx that is not an image.
    pub async fn profile_picture(&self, user_id: Option<i64>) -> ClientResult<Option<ProfileImage>> {
        let url = self.endpoint(&["api", "accounts", "profile"])?;
        let mut req = self.authed(Method::GET, url)?;
        if let Some(id) = user_id {
            req = req.query(&[("id", id)]);
        }

        let response = match self.send(req).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !media::is_image(&content_type) {
            tracing::warn!(%content_type, "Profile picture response is not an image");
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        Ok(Some(ProfileImage {
            content_type,
            bytes,
        }))
    }

    /// Picture for `username`; the session's own user skips the id lookup.
    pub async fn profile_picture_for(&self, username: &str) -> ClientResult<Option<ProfileImage>> {
        let own = self.session.username()?;
        let user_id = if own.as_deref() == Some(username) {
            None
        } else {
            Some(self.user_id(username).await?)
        };
        self.profile_picture(user_id).await
    }

    /// POST /api/accounts/profile/ (multipart)
    pub async fn upload_profile_picture(&self, file: &Path) -> ClientResult<()> {
        let url = self.endpoint(&["api", "accounts", "profile"])?;
        let form = picture_form(file).await?;
        self.discard(self.authed(Method::POST, url)?.multipart(form))
            .await
    }

    /// PUT /api/accounts/profile/put/ (multipart)
    pub async fn replace_profile_picture(&self, file: &Path) -> ClientResult<()> {
        let url = self.endpoint(&["api", "accounts", "profile", "put"])?;
        let form = picture_form(file).await?;
        self.discard(self.authed(Method::PUT, url)?.multipart(form))
            .await
    }

    /// DELETE /api/accounts/profile/
    pub async fn delete_profile_picture(&self) -> ClientResult<()> {
        let url = self.endpoint(&["api", "accounts", "profile"])?;
        self.discard(self.authed(Method::DELETE, url)?).await
    }
}

async fn picture_form(file: &Path) -> ClientResult<Form> {
    let bytes = tokio::fs::read(file).await?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "profile_picture".to_string());

    let part = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(&media::content_type_for(file))?;

    Ok(Form::new().part(PROFILE_PICTURE_FIELD, part))
}
