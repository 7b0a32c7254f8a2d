use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;

/// A work history entry. The experience list is most-recent-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An education entry. The education list is most-recent-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Links to a user's presence on other platforms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// A user's developer profile. At most one exists per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(user: Uuid, status: impl Into<String>, skills: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user,
            company: None,
            website: None,
            location: None,
            bio: None,
            status: status.into(),
            github_username: None,
            skills,
            social: SocialLinks::default(),
            experience: Vec::new(),
            education: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Prepends a work history entry (most recent first).
    pub fn add_experience(&mut self, entry: Experience) {
        self.experience.insert(0, entry);
    }

    /// Removes a work history entry by id, preserving the order of the rest.
    ///
    /// Returns `true` if the list changed.
    pub fn remove_experience(&mut self, entry_id: Uuid) -> bool {
        let before = self.experience.len();
        self.experience.retain(|e| e.id != entry_id);
        self.experience.len() != before
    }

    /// Prepends an education entry (most recent first).
    pub fn add_education(&mut self, entry: Education) {
        self.education.insert(0, entry);
    }

    /// Removes an education entry by id, preserving the order of the rest.
    ///
    /// Returns `true` if the list changed.
    pub fn remove_education(&mut self, entry_id: Uuid) -> bool {
        let before = self.education.len();
        self.education.retain(|e| e.id != entry_id);
        self.education.len() != before
    }
}

/// A profile joined with the owning user's display fields, as returned by
/// the read endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub owner: UserSummary,
}

/// Splits a comma-separated skills field into a trimmed, non-empty list.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experience(title: &str) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            title: title.to_string(),
            company: "Initech".to_string(),
            location: None,
            from: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            to: None,
            current: true,
            description: None,
        }
    }

    #[test]
    fn test_parse_skills_trims_and_drops_empties() {
        let skills = parse_skills(" rust , sql ,,  http ");
        assert_eq!(skills, vec!["rust", "sql", "http"]);
    }

    #[test]
    fn test_experience_most_recent_first() {
        let mut profile = Profile::new(Uuid::new_v4(), "Developer", vec!["rust".into()]);
        profile.add_experience(experience("older"));
        profile.add_experience(experience("newer"));

        assert_eq!(profile.experience[0].title, "newer");
        assert_eq!(profile.experience[1].title, "older");
    }

    #[test]
    fn test_add_then_remove_experience_round_trips() {
        let mut profile = Profile::new(Uuid::new_v4(), "Developer", vec!["rust".into()]);
        profile.add_experience(experience("kept"));
        let kept: Vec<Uuid> = profile.experience.iter().map(|e| e.id).collect();

        let entry = experience("temporary");
        let entry_id = entry.id;
        profile.add_experience(entry);

        assert!(profile.remove_experience(entry_id));
        let after: Vec<Uuid> = profile.experience.iter().map(|e| e.id).collect();
        assert_eq!(after, kept);
    }

    #[test]
    fn test_remove_missing_entry_is_noop() {
        let mut profile = Profile::new(Uuid::new_v4(), "Developer", vec![]);
        profile.add_experience(experience("kept"));

        assert!(!profile.remove_experience(Uuid::new_v4()));
        assert_eq!(profile.experience.len(), 1);
    }

    #[test]
    fn test_profile_view_flattens_profile_fields() {
        let profile = Profile::new(Uuid::new_v4(), "Developer", vec!["rust".into()]);
        let view = ProfileView {
            profile: profile.clone(),
            owner: UserSummary {
                id: profile.user,
                name: "Ada".to_string(),
                avatar: "http://a/img".to_string(),
            },
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "Developer");
        assert_eq!(json["owner"]["name"], "Ada");
    }
}
