//! Profile handlers: upsert, reads, experience/education entries, and
//! account deletion.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::AuthUser;
use super::AppState;
use crate::db::{PostRepository, ProfileRepository, UserRepository};
use crate::error::{ApiError, FieldError};
use crate::models::{
    profile::parse_skills, Education, Experience, Profile, ProfileView, SocialLinks,
};

const NO_PROFILE: &str = "There is no profile for this user";
const PROFILE_NOT_FOUND: &str = "Profile not found";

async fn load_own_profile(
    repo: &ProfileRepository,
    identity: AuthUser,
) -> Result<Profile, ApiError> {
    repo.get_by_user(identity.id)
        .await?
        .ok_or(ApiError::NotFound(NO_PROFILE))
}

/// Parses a required `YYYY-MM-DD` date field.
fn parse_date(
    raw: &Option<String>,
    param: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<NaiveDate> {
    match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.push(FieldError {
                    param,
                    msg: "Date must be YYYY-MM-DD".to_string(),
                });
                None
            }
        },
        None => None,
    }
}

fn require(
    raw: &Option<String>,
    param: &'static str,
    msg: &str,
    errors: &mut Vec<FieldError>,
) -> String {
    match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => {
            errors.push(FieldError {
                param,
                msg: msg.to_string(),
            });
            String::new()
        }
    }
}

/// GET /api/profile/me
pub async fn get_own_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
) -> Result<Json<ProfileView>, ApiError> {
    let view = ProfileRepository::new(state.pool.clone())
        .get_view_by_user(identity.id)
        .await?
        .ok_or(ApiError::NotFound(NO_PROFILE))?;

    Ok(Json(view))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub github_username: Option<String>,
    /// Comma-separated list, e.g. `"rust, sql, http"`.
    pub skills: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

/// POST /api/profile: create the caller's profile, or replace its fields if
/// one already exists. Experience and education are untouched by an upsert.
pub async fn upsert_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    let status = require(&req.status, "status", "Status is required", &mut errors);
    let skills = require(&req.skills, "skills", "Skills are required", &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let social = SocialLinks {
        youtube: req.youtube,
        twitter: req.twitter,
        facebook: req.facebook,
        linkedin: req.linkedin,
        instagram: req.instagram,
    };

    let repo = ProfileRepository::new(state.pool.clone());
    let existing = repo.get_by_user(identity.id).await?;
    let is_new = existing.is_none();
    let mut profile =
        existing.unwrap_or_else(|| Profile::new(identity.id, &status, Vec::new()));

    profile.company = req.company;
    profile.website = req.website;
    profile.location = req.location;
    profile.bio = req.bio;
    profile.status = status;
    profile.github_username = req.github_username;
    profile.skills = parse_skills(&skills);
    profile.social = social;

    if is_new {
        repo.insert(&profile).await?;
    } else {
        profile.updated_at = Utc::now();
        repo.save(&profile).await?;
    }

    Ok(Json(profile))
}

/// GET /api/profile: all profiles with owner name/avatar joined in.
pub async fn list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileView>>, ApiError> {
    let views = ProfileRepository::new(state.pool.clone())
        .list_views()
        .await?;
    Ok(Json(views))
}

/// GET /api/profile/user/{user_id}
pub async fn get_profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let user_id =
        Uuid::parse_str(&user_id).map_err(|_| ApiError::NotFound(PROFILE_NOT_FOUND))?;

    let view = ProfileRepository::new(state.pool.clone())
        .get_view_by_user(user_id)
        .await?
        .ok_or(ApiError::NotFound(PROFILE_NOT_FOUND))?;

    Ok(Json(view))
}

#[derive(Serialize)]
pub struct AccountDeletedResponse {
    pub msg: &'static str,
}

/// DELETE /api/profile: remove the caller's profile, posts, tokens, and
/// account. The caller's comments and likes on other users' posts remain.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
) -> Result<Json<AccountDeletedResponse>, ApiError> {
    let posts = PostRepository::new(state.pool.clone());
    let profiles = ProfileRepository::new(state.pool.clone());
    let users = UserRepository::new(state.pool.clone());

    let removed = posts.delete_by_user(identity.id).await?;
    profiles.delete_by_user(identity.id).await?;
    users.revoke_tokens(identity.id).await?;
    users.delete(identity.id).await?;

    tracing::info!("deleted account {} and {} post(s)", identity.id, removed);

    Ok(Json(AccountDeletedResponse { msg: "User deleted" }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

/// PUT /api/profile/experience: prepend a work history entry.
pub async fn add_experience(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Json(req): Json<ExperienceRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    let title = require(&req.title, "title", "Title is required", &mut errors);
    let company = require(&req.company, "company", "Company is required", &mut errors);
    if req.from.as_deref().map(str::trim).unwrap_or("").is_empty() {
        errors.push(FieldError {
            param: "from",
            msg: "From date is required".to_string(),
        });
    }
    let from = parse_date(&req.from, "from", &mut errors);
    let to = parse_date(&req.to, "to", &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let from = from.ok_or(ApiError::validation("from", "From date is required"))?;

    let repo = ProfileRepository::new(state.pool.clone());
    let mut profile = load_own_profile(&repo, identity).await?;

    profile.add_experience(Experience {
        id: Uuid::new_v4(),
        title,
        company,
        location: req.location,
        from,
        to,
        current: req.current.unwrap_or(false),
        description: req.description,
    });
    profile.updated_at = Utc::now();
    repo.save(&profile).await?;

    Ok(Json(profile))
}

/// DELETE /api/profile/experience/{exp_id}: remove an entry by its id.
/// Removing an id that is not present leaves the profile unchanged.
pub async fn delete_experience(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let repo = ProfileRepository::new(state.pool.clone());
    let mut profile = load_own_profile(&repo, identity).await?;

    if let Ok(entry_id) = Uuid::parse_str(&exp_id) {
        if profile.remove_experience(entry_id) {
            profile.updated_at = Utc::now();
            repo.save(&profile).await?;
        }
    }

    Ok(Json(profile))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

/// PUT /api/profile/education: prepend an education entry.
pub async fn add_education(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Json(req): Json<EducationRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    let school = require(&req.school, "school", "School is required", &mut errors);
    let degree = require(&req.degree, "degree", "Degree is required", &mut errors);
    let field_of_study = require(
        &req.field_of_study,
        "field_of_study",
        "Field of study is required",
        &mut errors,
    );
    if req.from.as_deref().map(str::trim).unwrap_or("").is_empty() {
        errors.push(FieldError {
            param: "from",
            msg: "From date is required".to_string(),
        });
    }
    let from = parse_date(&req.from, "from", &mut errors);
    let to = parse_date(&req.to, "to", &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    let from = from.ok_or(ApiError::validation("from", "From date is required"))?;

    let repo = ProfileRepository::new(state.pool.clone());
    let mut profile = load_own_profile(&repo, identity).await?;

    profile.add_education(Education {
        id: Uuid::new_v4(),
        school,
        degree,
        field_of_study,
        from,
        to,
        current: req.current.unwrap_or(false),
        description: req.description,
    });
    profile.updated_at = Utc::now();
    repo.save(&profile).await?;

    Ok(Json(profile))
}

/// DELETE /api/profile/education/{edu_id}: remove an entry by its id.
pub async fn delete_education(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let repo = ProfileRepository::new(state.pool.clone());
    let mut profile = load_own_profile(&repo, identity).await?;

    if let Ok(entry_id) = Uuid::parse_str(&edu_id) {
        if profile.remove_education(entry_id) {
            profile.updated_at = Utc::now();
            repo.save(&profile).await?;
        }
    }

    Ok(Json(profile))
}
