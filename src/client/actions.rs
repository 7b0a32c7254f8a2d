//! Typed API client and the actions that publish its results to the store.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::store::{ApiFailure, Event, Store};
use crate::models::{Comment, Like, Post, Profile, ProfileView, User};
use crate::server::users::TokenResponse;

/// Errors from the API client.
#[derive(Debug)]
pub enum ClientError {
    /// The request never produced a response.
    Transport(String),
    /// The server answered with a non-success status.
    Api { status: u16, msg: String },
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "transport error: {}", e),
            ClientError::Api { status, msg } => write!(f, "api error ({}): {}", status, msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// One method per API endpoint.
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            http: reqwest::Client::new(),
        }
    }

    /// Sets the Bearer token sent on private routes.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn expect<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            // Error bodies are {"msg": ...} or {"errors": [{param, msg}]}.
            let body = response.text().await.unwrap_or_default();
            let msg = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("msg")
                        .and_then(|m| m.as_str().map(str::to_string))
                        .or_else(|| {
                            v.get("errors")?
                                .get(0)?
                                .get("msg")?
                                .as_str()
                                .map(str::to_string)
                        })
                })
                .unwrap_or(body);
            return Err(ClientError::Api {
                status: status.as_u16(),
                msg,
            });
        }
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        Self::expect(self.request(reqwest::Method::GET, path).send().await?).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        Self::expect(self.request(method, path).json(body).send().await?).await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, ClientError> {
        self.send_json(
            reqwest::Method::POST,
            "/api/users",
            &json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ClientError> {
        self.send_json(
            reqwest::Method::POST,
            "/api/auth",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.get("/api/auth").await
    }

    pub async fn posts(&self) -> Result<Vec<Post>, ClientError> {
        self.get("/api/posts").await
    }

    pub async fn post(&self, id: Uuid) -> Result<Post, ClientError> {
        self.get(&format!("/api/posts/{}", id)).await
    }

    pub async fn create_post(&self, text: &str) -> Result<Post, ClientError> {
        self.send_json(reqwest::Method::POST, "/api/posts", &json!({ "text": text }))
            .await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/api/posts/{}", id))
            .send()
            .await?;
        Self::expect::<serde_json::Value>(response).await.map(|_| ())
    }

    pub async fn like(&self, id: Uuid) -> Result<Vec<Like>, ClientError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/api/posts/like/{}", id))
            .send()
            .await?;
        Self::expect(response).await
    }

    pub async fn unlike(&self, id: Uuid) -> Result<Vec<Like>, ClientError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/api/posts/unlike/{}", id))
            .send()
            .await?;
        Self::expect(response).await
    }

    pub async fn add_comment(&self, id: Uuid, text: &str) -> Result<Vec<Comment>, ClientError> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/api/posts/comment/{}", id),
            &json!({ "text": text }),
        )
        .await
    }

    pub async fn delete_comment(
        &self,
        id: Uuid,
        comment_id: Uuid,
    ) -> Result<Vec<Comment>, ClientError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/api/posts/comment/{}/{}", id, comment_id),
            )
            .send()
            .await?;
        Self::expect(response).await
    }

    pub async fn my_profile(&self) -> Result<ProfileView, ClientError> {
        self.get("/api/profile/me").await
    }

    pub async fn profiles(&self) -> Result<Vec<ProfileView>, ClientError> {
        self.get("/api/profile").await
    }

    pub async fn profile_by_user(&self, user_id: Uuid) -> Result<ProfileView, ClientError> {
        self.get(&format!("/api/profile/user/{}", user_id)).await
    }

    pub async fn upsert_profile(&self, draft: &ProfileDraft) -> Result<Profile, ClientError> {
        self.send_json(reqwest::Method::POST, "/api/profile", draft)
            .await
    }

    pub async fn add_experience(&self, draft: &ExperienceDraft) -> Result<Profile, ClientError> {
        self.send_json(reqwest::Method::PUT, "/api/profile/experience", draft)
            .await
    }

    pub async fn delete_experience(&self, entry_id: Uuid) -> Result<Profile, ClientError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/api/profile/experience/{}", entry_id),
            )
            .send()
            .await?;
        Self::expect(response).await
    }

    pub async fn add_education(&self, draft: &EducationDraft) -> Result<Profile, ClientError> {
        self.send_json(reqwest::Method::PUT, "/api/profile/education", draft)
            .await
    }

    pub async fn delete_education(&self, entry_id: Uuid) -> Result<Profile, ClientError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/api/profile/education/{}", entry_id),
            )
            .send()
            .await?;
        Self::expect(response).await
    }

    pub async fn delete_account(&self) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::DELETE, "/api/profile")
            .send()
            .await?;
        Self::expect::<serde_json::Value>(response).await.map(|_| ())
    }

    pub async fn github_repos(&self, username: &str) -> Result<serde_json::Value, ClientError> {
        self.get(&format!(
            "/api/profile/github/{}",
            urlencoding::encode(username)
        ))
        .await
    }
}

/// Profile fields as submitted from a profile form.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProfileDraft {
    pub status: String,
    /// Comma-separated, e.g. `"rust, sql"`.
    pub skills: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
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

/// A work history entry as submitted from a form. Dates are `YYYY-MM-DD`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExperienceDraft {
    pub title: String,
    pub company: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An education entry as submitted from a form. Dates are `YYYY-MM-DD`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct EducationDraft {
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn failure(err: ClientError) -> ApiFailure {
    match err {
        ClientError::Transport(msg) => ApiFailure { status: 500, msg },
        ClientError::Api { status, msg } => ApiFailure { status, msg },
    }
}

/// One action per endpoint: perform the call, then dispatch the tagged
/// outcome event to the store.
pub struct Actions<'a> {
    client: &'a ApiClient,
    store: &'a mut Store,
}

impl<'a> Actions<'a> {
    pub fn new(client: &'a ApiClient, store: &'a mut Store) -> Self {
        Self { client, store }
    }

    pub async fn load_posts(&mut self) {
        match self.client.posts().await {
            Ok(posts) => self.store.dispatch(Event::PostsLoaded(posts)),
            Err(e) => self.store.dispatch(Event::PostFailed(failure(e))),
        }
    }

    pub async fn load_post(&mut self, id: Uuid) {
        match self.client.post(id).await {
            Ok(post) => self.store.dispatch(Event::PostLoaded(post)),
            Err(e) => self.store.dispatch(Event::PostFailed(failure(e))),
        }
    }

    pub async fn add_post(&mut self, text: &str) {
        match self.client.create_post(text).await {
            Ok(post) => self.store.dispatch(Event::PostAdded(post)),
            Err(e) => self.store.dispatch(Event::PostFailed(failure(e))),
        }
    }

    pub async fn delete_post(&mut self, id: Uuid) {
        match self.client.delete_post(id).await {
            Ok(()) => self.store.dispatch(Event::PostDeleted(id)),
            Err(e) => self.store.dispatch(Event::PostFailed(failure(e))),
        }
    }

    pub async fn add_like(&mut self, id: Uuid) {
        match self.client.like(id).await {
            Ok(likes) => self.store.dispatch(Event::LikesUpdated { post: id, likes }),
            Err(e) => self.store.dispatch(Event::PostFailed(failure(e))),
        }
    }

    pub async fn remove_like(&mut self, id: Uuid) {
        match self.client.unlike(id).await {
            Ok(likes) => self.store.dispatch(Event::LikesUpdated { post: id, likes }),
            Err(e) => self.store.dispatch(Event::PostFailed(failure(e))),
        }
    }

    pub async fn add_comment(&mut self, id: Uuid, text: &str) {
        match self.client.add_comment(id, text).await {
            Ok(comments) => self
                .store
                .dispatch(Event::CommentsUpdated { post: id, comments }),
            Err(e) => self.store.dispatch(Event::PostFailed(failure(e))),
        }
    }

    pub async fn delete_comment(&mut self, id: Uuid, comment_id: Uuid) {
        match self.client.delete_comment(id, comment_id).await {
            Ok(comments) => self
                .store
                .dispatch(Event::CommentsUpdated { post: id, comments }),
            Err(e) => self.store.dispatch(Event::PostFailed(failure(e))),
        }
    }

    pub async fn load_current_profile(&mut self) {
        match self.client.my_profile().await {
            Ok(view) => self.store.dispatch(Event::ProfileLoaded(view)),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }

    pub async fn load_profiles(&mut self) {
        match self.client.profiles().await {
            Ok(views) => self.store.dispatch(Event::ProfilesLoaded(views)),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }

    pub async fn load_profile(&mut self, user_id: Uuid) {
        match self.client.profile_by_user(user_id).await {
            Ok(view) => self.store.dispatch(Event::ProfileLoaded(view)),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }

    pub async fn create_profile(&mut self, draft: &ProfileDraft) {
        match self.client.upsert_profile(draft).await {
            Ok(profile) => self.store.dispatch(Event::ProfileUpdated(profile)),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }

    pub async fn add_experience(&mut self, draft: &ExperienceDraft) {
        match self.client.add_experience(draft).await {
            Ok(profile) => self.store.dispatch(Event::ProfileUpdated(profile)),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }

    pub async fn delete_experience(&mut self, entry_id: Uuid) {
        match self.client.delete_experience(entry_id).await {
            Ok(profile) => self.store.dispatch(Event::ProfileUpdated(profile)),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }

    pub async fn add_education(&mut self, draft: &EducationDraft) {
        match self.client.add_education(draft).await {
            Ok(profile) => self.store.dispatch(Event::ProfileUpdated(profile)),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }

    pub async fn delete_education(&mut self, entry_id: Uuid) {
        match self.client.delete_education(entry_id).await {
            Ok(profile) => self.store.dispatch(Event::ProfileUpdated(profile)),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }

    pub async fn delete_account(&mut self) {
        match self.client.delete_account().await {
            Ok(()) => self.store.dispatch(Event::AccountDeleted),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }

    pub async fn load_github_repos(&mut self, username: &str) {
        match self.client.github_repos(username).await {
            Ok(repos) => self.store.dispatch(Event::ReposLoaded(repos)),
            Err(e) => self.store.dispatch(Event::ProfileFailed(failure(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_path() {
        let client = ApiClient::new("http://localhost:5000");
        assert_eq!(client.url("/api/posts"), "http://localhost:5000/api/posts");
    }

    #[test]
    fn test_profile_draft_skips_empty_optionals() {
        let draft = ProfileDraft {
            status: "Developer".to_string(),
            skills: "rust, sql".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(json["status"], "Developer");
        assert!(json.get("company").is_none());
        assert!(json.get("youtube").is_none());
    }

    #[test]
    fn test_failure_mapping() {
        let api = failure(ClientError::Api {
            status: 404,
            msg: "No post found".to_string(),
        });
        assert_eq!(api.status, 404);

        let transport = failure(ClientError::Transport("refused".to_string()));
        assert_eq!(transport.status, 500);
    }
}
