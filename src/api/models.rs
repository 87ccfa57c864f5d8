// Wire models for the streaming server's JSON API
// Field names match the server's responses exactly - keep serde renames out of here

use serde::{Deserialize, Serialize};

/// A song as the catalog returns it. Love fields default to zero/false because
/// the admin listing omits `is_loved` (admins see aggregate counts only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub duration_seconds: Option<f64>,
    pub filename: String,
    #[serde(default)]
    pub love_count: i64,
    #[serde(default)]
    pub is_loved: bool,
}

impl Song {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.filename
        } else {
            &self.title
        }
    }

    /// "3:07" style duration, empty when the server has no duration for the file
    pub fn duration_string(&self) -> String {
        match self.duration_seconds {
            Some(secs) if secs >= 0.0 => {
                let total = secs as u64;
                format!("{}:{:02}", total / 60, total % 60)
            }
            _ => String::new(),
        }
    }

    pub fn love_marker(&self) -> &'static str {
        if self.is_loved {
            "\u{2764}"
        } else {
            "\u{2661}"
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Admin-only view of an account
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

impl AdminUser {
    /// Server sends ISO-8601; show just the date, fall back to the raw string
    pub fn created_date(&self) -> String {
        self.created_at
            .parse::<chrono::NaiveDateTime>()
            .map(|dt| dt.date().to_string())
            .unwrap_or_else(|_| self.created_at.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub auto_change_background: bool,
    pub allow_registration: bool,
}

/// PATCH body for /api/admin/settings - unset fields are left untouched server-side
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_change_background: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_registration: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackgroundImage {
    pub id: i64,
    pub filename: String,
    pub is_active: bool,
}

/// Response to love/unlove - the server echoes the resulting state
#[derive(Debug, Clone, Deserialize)]
pub struct LoveState {
    pub loved: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_parsing_with_love_fields() {
        let json = r#"{
            "id": 7,
            "title": "Holocene",
            "artist": "Bon Iver",
            "duration_seconds": 337.2,
            "filename": "holocene.mp3",
            "love_count": 12,
            "is_loved": true
        }"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert_eq!(song.id, 7);
        assert_eq!(song.love_count, 12);
        assert!(song.is_loved);
        assert_eq!(song.duration_string(), "5:37");
    }

    #[test]
    fn test_song_parsing_admin_shape() {
        // Admin listing has no is_loved field
        let json = r#"{
            "id": 3,
            "title": "",
            "artist": "",
            "duration_seconds": null,
            "filename": "upload_abc.mp3",
            "love_count": 2
        }"#;
        let song: Song = serde_json::from_str(json).unwrap();
        assert!(!song.is_loved);
        assert_eq!(song.display_title(), "upload_abc.mp3");
        assert_eq!(song.duration_string(), "");
    }

    #[test]
    fn test_settings_update_skips_unset_fields() {
        let patch = SettingsUpdate {
            auto_change_background: Some(true),
            ..Default::default()
        };
        let body = serde_json::to_string(&patch).unwrap();
        assert_eq!(body, r#"{"auto_change_background":true}"#);
    }

    #[test]
    fn test_admin_user_created_date() {
        let user = AdminUser {
            id: 1,
            username: "kai".to_string(),
            role: "admin".to_string(),
            created_at: "2025-11-03T09:15:00".to_string(),
        };
        assert_eq!(user.created_date(), "2025-11-03");
    }
}
