//! Artist profile models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Artist categories assignable by an admin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtistCategory {
    #[serde(rename = "DJ")]
    Dj,
    Group,
}

impl std::fmt::Display for ArtistCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtistCategory::Dj => write!(f, "DJ"),
            ArtistCategory::Group => write!(f, "Group"),
        }
    }
}

impl std::str::FromStr for ArtistCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DJ" => Ok(ArtistCategory::Dj),
            "Group" => Ok(ArtistCategory::Group),
            _ => Err(format!("Unknown artist category: {}", s)),
        }
    }
}

/// Profile row. The gallery is stored as a JSON array of stored file paths.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ArtistProfile {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub link: Option<String>,
    pub rate: Option<String>,
    pub category: Option<String>,
    pub logo_path: Option<String>,
    pub gallery: String,
    pub bio: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ArtistProfile {
    /// Parse the gallery JSON column; malformed data reads as empty
    pub fn gallery_paths(&self) -> Vec<String> {
        serde_json::from_str(&self.gallery).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistProfileResponse {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub link: Option<String>,
    pub rate: Option<String>,
    pub category: Option<String>,
    pub logo_url: Option<String>,
    pub gallery_urls: Vec<String>,
    pub bio: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ArtistProfile> for ArtistProfileResponse {
    fn from(profile: ArtistProfile) -> Self {
        let gallery_urls = profile.gallery_paths();
        Self {
            id: profile.id,
            user_id: profile.user_id,
            display_name: profile.display_name,
            phone: profile.phone,
            link: profile.link,
            rate: profile.rate,
            category: profile.category,
            logo_url: profile.logo_path,
            gallery_urls,
            bio: profile.bio,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Request body for POST /profile (create-or-update)
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub display_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub rate: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request body for PATCH /artists/:id/category
#[derive(Debug, Deserialize)]
pub struct SetCategoryRequest {
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("DJ".parse::<ArtistCategory>().unwrap(), ArtistCategory::Dj);
        assert_eq!(
            "Group".parse::<ArtistCategory>().unwrap(),
            ArtistCategory::Group
        );
        assert!("Band".parse::<ArtistCategory>().is_err());
        // case-sensitive on purpose: stored values are canonical
        assert!("dj".parse::<ArtistCategory>().is_err());
    }

    #[test]
    fn test_gallery_paths_malformed_json() {
        let profile = ArtistProfile {
            id: "p1".into(),
            user_id: "u1".into(),
            display_name: "DJ Test".into(),
            phone: None,
            link: None,
            rate: None,
            category: None,
            logo_path: None,
            gallery: "not-json".into(),
            bio: None,
            created_at: "2025-01-01T00:00:00+00:00".into(),
            updated_at: "2025-01-01T00:00:00+00:00".into(),
        };
        assert!(profile.gallery_paths().is_empty());
    }
}
