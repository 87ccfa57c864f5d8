use super::models::{CurrentUser, LoveState, Song, Token};
use super::{error_detail, ApiError};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Typed client for the streaming server. Holds the bearer token for the
/// session; persistence of that token is the TokenStore's job, not ours.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_token(base_url, None)
    }

    pub fn with_token(base_url: impl Into<String>, token: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http_get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn http_post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    pub(crate) fn http_patch(&self, path: &str) -> RequestBuilder {
        self.http.patch(self.url(path))
    }

    pub(crate) fn http_delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    pub(crate) fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map the HTTP layer into our error taxonomy before anyone reads a body.
    pub(crate) async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }
        Ok(response)
    }

    // --- session ---

    /// Log in with the server's form-encoded token endpoint. The returned
    /// token is kept on the client for subsequent calls.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Token, ApiError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        let token: Token = Self::check(response).await?.json().await?;
        self.token = Some(token.access_token.clone());
        Ok(token)
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<Token, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
            "password_confirm": password_confirm,
        });
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await?;
        let token: Token = Self::check(response).await?.json().await?;
        self.token = Some(token.access_token.clone());
        Ok(token)
    }

    pub async fn me(&self) -> Result<CurrentUser, ApiError> {
        let response = self.authed(self.http_get("/api/auth/me")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn registration_allowed(&self) -> Result<bool, ApiError> {
        #[derive(Deserialize)]
        struct Out {
            allow_registration: bool,
        }
        let response = self
            .http
            .get(self.url("/api/auth/registration-allowed"))
            .send()
            .await?;
        let out: Out = Self::check(response).await?.json().await?;
        Ok(out.allow_registration)
    }

    // --- catalog ---

    pub async fn list_songs(&self, search: Option<&str>) -> Result<Vec<Song>, ApiError> {
        let mut request = self.authed(self.http_get("/api/songs"));
        if let Some(query) = search.filter(|q| !q.is_empty()) {
            request = request.query(&[("search", query)]);
        }
        let response = request.send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch the full audio content for one song. The caller owns the bytes
    /// and hands them to the audio engine, which drops them on track change.
    pub async fn stream_song(&self, song_id: i64) -> Result<Vec<u8>, ApiError> {
        let response = self
            .authed(self.http.get(self.url(&format!("/api/songs/{song_id}/stream"))))
            .send()
            .await?;
        let bytes = Self::check(response).await?.bytes().await?;
        debug!("fetched {} bytes for song {}", bytes.len(), song_id);
        Ok(bytes.to_vec())
    }

    pub async fn love_song(&self, song_id: i64) -> Result<LoveState, ApiError> {
        let response = self
            .authed(self.http.post(self.url(&format!("/api/songs/{song_id}/love"))))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn unlove_song(&self, song_id: i64) -> Result<LoveState, ApiError> {
        let response = self
            .authed(self.http.delete(self.url(&format!("/api/songs/{song_id}/love"))))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Currently active background image, as raw image bytes.
    pub async fn active_background(&self) -> Result<Vec<u8>, ApiError> {
        let response = self
            .authed(self.http.get(self.url("/api/songs/background/active")))
            .send()
            .await?;
        Ok(Self::check(response).await?.bytes().await?.to_vec())
    }

    pub async fn random_background(&self) -> Result<Vec<u8>, ApiError> {
        let response = self
            .authed(self.http.get(self.url("/api/songs/background/random")))
            .send()
            .await?;
        Ok(Self::check(response).await?.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ApiClient::new("http://music.local:8000/");
        assert_eq!(client.url("/api/songs"), "http://music.local:8000/api/songs");
    }
}
