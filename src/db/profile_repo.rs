use sqlx::SqlitePool;
use uuid::Uuid;

use super::user_repo::{parse_timestamp, parse_uuid};
use crate::models::{Profile, ProfileView, UserSummary};

/// Profile documents, one per user. Skills, social links, experience and
/// education are embedded JSON lists written back whole on every mutation.
pub struct ProfileRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: String,
    user_id: String,
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    status: String,
    github_username: Option<String>,
    skills: String,
    social: String,
    experience: String,
    education: String,
    created_at: String,
    updated_at: String,
}

/// ProfileRow plus the owning user's display fields.
#[derive(sqlx::FromRow)]
struct ProfileViewRow {
    #[sqlx(flatten)]
    profile: ProfileRow,
    owner_name: String,
    owner_avatar: String,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile, sqlx::Error> {
        Ok(Profile {
            id: parse_uuid(&self.id)?,
            user: parse_uuid(&self.user_id)?,
            company: self.company,
            website: self.website,
            location: self.location,
            bio: self.bio,
            status: self.status,
            github_username: self.github_username,
            skills: serde_json::from_str(&self.skills).unwrap_or_default(),
            social: serde_json::from_str(&self.social).unwrap_or_default(),
            experience: serde_json::from_str(&self.experience).unwrap_or_default(),
            education: serde_json::from_str(&self.education).unwrap_or_default(),
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

impl ProfileViewRow {
    fn into_view(self) -> Result<ProfileView, sqlx::Error> {
        let name = self.owner_name;
        let avatar = self.owner_avatar;
        let profile = self.profile.into_profile()?;
        Ok(ProfileView {
            owner: UserSummary {
                id: profile.user,
                name,
                avatar,
            },
            profile,
        })
    }
}

const VIEW_QUERY: &str = r#"
    SELECT p.*, u.name AS owner_name, u.avatar AS owner_avatar
    FROM profiles p
    JOIN users u ON u.id = p.user_id
"#;

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, profile: &Profile) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, user_id, company, website, location, bio, status,
                                  github_username, skills, social, experience, education,
                                  created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile.id.to_string())
        .bind(profile.user.to_string())
        .bind(&profile.company)
        .bind(&profile.website)
        .bind(&profile.location)
        .bind(&profile.bio)
        .bind(&profile.status)
        .bind(&profile.github_username)
        .bind(encode(&profile.skills))
        .bind(encode(&profile.social))
        .bind(encode(&profile.experience))
        .bind(encode(&profile.education))
        .bind(profile.created_at.to_rfc3339())
        .bind(profile.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes every mutable column of the profile document back.
    pub async fn save(&self, profile: &Profile) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE profiles
            SET company = ?, website = ?, location = ?, bio = ?, status = ?,
                github_username = ?, skills = ?, social = ?, experience = ?,
                education = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.company)
        .bind(&profile.website)
        .bind(&profile.location)
        .bind(&profile.bio)
        .bind(&profile.status)
        .bind(&profile.github_username)
        .bind(encode(&profile.skills))
        .bind(encode(&profile.social))
        .bind(encode(&profile.experience))
        .bind(encode(&profile.education))
        .bind(profile.updated_at.to_rfc3339())
        .bind(profile.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    /// Profile for a user joined with the owner's name and avatar.
    pub async fn get_view_by_user(&self, user_id: Uuid) -> Result<Option<ProfileView>, sqlx::Error> {
        let query = format!("{} WHERE p.user_id = ?", VIEW_QUERY);
        let row: Option<ProfileViewRow> = sqlx::query_as(&query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProfileViewRow::into_view).transpose()
    }

    /// All profiles joined with their owners' names and avatars.
    pub async fn list_views(&self) -> Result<Vec<ProfileView>, sqlx::Error> {
        let query = format!("{} ORDER BY p.created_at", VIEW_QUERY);
        let rows: Vec<ProfileViewRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;

        rows.into_iter().map(ProfileViewRow::into_view).collect()
    }

    pub async fn delete_by_user(&self, user_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn encode<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, UserRepository};
    use crate::models::User;
    use tempfile::tempdir;

    async fn setup() -> (tempfile::TempDir, ProfileRepository, UserRepository) {
        let dir = tempdir().unwrap();
        let pool = init_db(&dir.path().join("test.db")).await.unwrap();
        (
            dir,
            ProfileRepository::new(pool.clone()),
            UserRepository::new(pool),
        )
    }

    async fn create_user(users: &UserRepository, name: &str, email: &str) -> User {
        let user = User::new(name, email, "hash", "http://a/img");
        users.create(&user).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (_dir, profiles, users) = setup().await;
        let user = create_user(&users, "Ada", "ada@example.com").await;

        let profile = Profile::new(user.id, "Developer", vec!["rust".into(), "sql".into()]);
        profiles.insert(&profile).await.unwrap();

        let loaded = profiles.get_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, "Developer");
        assert_eq!(loaded.skills, vec!["rust", "sql"]);
        assert!(loaded.experience.is_empty());
    }

    #[tokio::test]
    async fn test_one_profile_per_user() {
        let (_dir, profiles, users) = setup().await;
        let user = create_user(&users, "Ada", "ada@example.com").await;

        profiles
            .insert(&Profile::new(user.id, "Developer", vec![]))
            .await
            .unwrap();

        let second = profiles
            .insert(&Profile::new(user.id, "Manager", vec![]))
            .await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_view_joins_owner_fields() {
        let (_dir, profiles, users) = setup().await;
        let user = create_user(&users, "Ada", "ada@example.com").await;
        profiles
            .insert(&Profile::new(user.id, "Developer", vec![]))
            .await
            .unwrap();

        let view = profiles.get_view_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(view.owner.name, "Ada");
        assert_eq!(view.owner.avatar, "http://a/img");
        assert_eq!(view.owner.id, user.id);
    }

    #[tokio::test]
    async fn test_list_views() {
        let (_dir, profiles, users) = setup().await;
        let ada = create_user(&users, "Ada", "ada@example.com").await;
        let eve = create_user(&users, "Eve", "eve@example.com").await;
        profiles
            .insert(&Profile::new(ada.id, "Developer", vec![]))
            .await
            .unwrap();
        profiles
            .insert(&Profile::new(eve.id, "Designer", vec![]))
            .await
            .unwrap();

        let views = profiles.list_views().await.unwrap();
        assert_eq!(views.len(), 2);
    }

    #[tokio::test]
    async fn test_save_round_trips_experience() {
        let (_dir, profiles, users) = setup().await;
        let user = create_user(&users, "Ada", "ada@example.com").await;
        let mut profile = Profile::new(user.id, "Developer", vec![]);
        profiles.insert(&profile).await.unwrap();

        profile.add_experience(crate::models::Experience {
            id: Uuid::new_v4(),
            title: "Engineer".to_string(),
            company: "Initech".to_string(),
            location: None,
            from: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            to: None,
            current: true,
            description: None,
        });
        profiles.save(&profile).await.unwrap();

        let loaded = profiles.get_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(loaded.experience.len(), 1);
        assert_eq!(loaded.experience[0].title, "Engineer");
    }

    #[tokio::test]
    async fn test_delete_by_user() {
        let (_dir, profiles, users) = setup().await;
        let user = create_user(&users, "Ada", "ada@example.com").await;
        profiles
            .insert(&Profile::new(user.id, "Developer", vec![]))
            .await
            .unwrap();

        profiles.delete_by_user(user.id).await.unwrap();
        assert!(profiles.get_by_user(user.id).await.unwrap().is_none());
    }
}
