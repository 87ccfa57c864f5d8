// Admin endpoints - song uploads and edits, user management, app settings,
// background images. All of these require an admin token server-side.

use super::client::ApiClient;
use super::models::{AdminUser, AppSettings, BackgroundImage, SettingsUpdate, Song};
use super::ApiError;
use reqwest::multipart::{Form, Part};
use tracing::info;

impl ApiClient {
    pub async fn admin_list_songs(&self, search: Option<&str>) -> Result<Vec<Song>, ApiError> {
        let mut request = self.authed(self.http_get("/api/admin/songs"));
        if let Some(query) = search.filter(|q| !q.is_empty()) {
            request = request.query(&[("search", query)]);
        }
        let response = request.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Upload one audio file. The server derives title/artist from the
    /// filename; use `admin_update_song` afterwards to fix them up.
    pub async fn admin_upload_song(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<Song, ApiError> {
        let part = Part::bytes(content).file_name(filename.to_string());
        let form = Form::new().part("file", part);
        let response = self
            .authed(self.http_post("/api/admin/songs"))
            .multipart(form)
            .send()
            .await?;
        let song: Song = Self::check(response).await?.json().await?;
        info!("uploaded song {} as id {}", filename, song.id);
        Ok(song)
    }

    pub async fn admin_update_song(
        &self,
        song_id: i64,
        title: Option<&str>,
        artist: Option<&str>,
    ) -> Result<Song, ApiError> {
        let body = serde_json::json!({ "title": title, "artist": artist });
        let response = self
            .authed(self.http_patch(&format!("/api/admin/songs/{song_id}")))
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn admin_delete_song(&self, song_id: i64) -> Result<(), ApiError> {
        let response = self
            .authed(self.http_delete(&format!("/api/admin/songs/{song_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        info!("deleted song {}", song_id);
        Ok(())
    }

    // --- users ---

    pub async fn admin_list_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        let response = self.authed(self.http_get("/api/admin/users")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// The server refuses to delete the account making the call.
    pub async fn admin_delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        let response = self
            .authed(self.http_delete(&format!("/api/admin/users/{user_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        info!("deleted user {}", user_id);
        Ok(())
    }

    // --- settings ---

    pub async fn admin_get_settings(&self) -> Result<AppSettings, ApiError> {
        let response = self.authed(self.http_get("/api/admin/settings")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn admin_update_settings(
        &self,
        update: &SettingsUpdate,
    ) -> Result<AppSettings, ApiError> {
        let response = self
            .authed(self.http_patch("/api/admin/settings"))
            .json(update)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    // --- background images ---

    pub async fn admin_list_backgrounds(&self) -> Result<Vec<BackgroundImage>, ApiError> {
        let response = self
            .authed(self.http_get("/api/admin/backgrounds"))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn admin_upload_background(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<BackgroundImage, ApiError> {
        let part = Part::bytes(content).file_name(filename.to_string());
        let form = Form::new().part("file", part);
        let response = self
            .authed(self.http_post("/api/admin/backgrounds"))
            .multipart(form)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Make one image the active background; the server deactivates the rest.
    pub async fn admin_activate_background(&self, image_id: i64) -> Result<(), ApiError> {
        let response = self
            .authed(self.http_post(&format!("/api/admin/backgrounds/{image_id}/activate")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn admin_delete_background(&self, image_id: i64) -> Result<(), ApiError> {
        let response = self
            .authed(self.http_delete(&format!("/api/admin/backgrounds/{image_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
