use reqwest::Method;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::{Settings, SettingsUpdate};
use crate::validation::FieldErrors;

impl ApiClient {
    /// GET /api/settings/{username}/
    pub async fn settings(&self, username: &str) -> ClientResult<Settings> {
        let url = self.endpoint(&["api", "settings", username])?;
        self.json(self.authed(Method::GET, url)?).await
    }

    /// PATCH /api/settings/profile/update/
    pub async fn update_settings(&self, update: &SettingsUpdate) -> ClientResult<()> {
        if update.is_empty() {
            let mut errors = FieldErrors::default();
            errors.insert("settings", "Nothing to update");
            return errors.into_result();
        }
        let url = self.endpoint(&["api", "settings", "profile", "update"])?;
        self.discard(self.authed(Method::PATCH, url)?.json(update))
            .await
    }
}
