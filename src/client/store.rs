//! Central event store the client layer dispatches into.

use uuid::Uuid;

use crate::models::{Comment, Like, Post, Profile, ProfileView};

/// A failed API call, tagged with the HTTP status the server answered with.
/// Transport failures (no response at all) carry status 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: u16,
    pub msg: String,
}

/// Tagged events published by actions. Views re-render from the store state
/// these produce.
#[derive(Debug, Clone)]
pub enum Event {
    PostsLoaded(Vec<Post>),
    PostLoaded(Post),
    PostAdded(Post),
    PostDeleted(Uuid),
    LikesUpdated { post: Uuid, likes: Vec<Like> },
    CommentsUpdated { post: Uuid, comments: Vec<Comment> },
    PostFailed(ApiFailure),

    ProfileLoaded(ProfileView),
    ProfilesLoaded(Vec<ProfileView>),
    ProfileUpdated(Profile),
    ReposLoaded(serde_json::Value),
    ProfileCleared,
    AccountDeleted,
    ProfileFailed(ApiFailure),
}

/// Client-side view state, updated only through [`Store::dispatch`].
#[derive(Debug, Default)]
pub struct Store {
    pub posts: Vec<Post>,
    pub post: Option<Post>,
    pub profile: Option<Profile>,
    pub profiles: Vec<ProfileView>,
    pub repos: Option<serde_json::Value>,
    pub error: Option<ApiFailure>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, event: Event) {
        match event {
            Event::PostsLoaded(posts) => {
                self.posts = posts;
                self.error = None;
            }
            Event::PostLoaded(post) => {
                self.post = Some(post);
                self.error = None;
            }
            Event::PostAdded(post) => {
                self.posts.insert(0, post);
                self.error = None;
            }
            Event::PostDeleted(id) => {
                self.posts.retain(|p| p.id != id);
                if self.post.as_ref().is_some_and(|p| p.id == id) {
                    self.post = None;
                }
                self.error = None;
            }
            Event::LikesUpdated { post, likes } => {
                if let Some(p) = self.posts.iter_mut().find(|p| p.id == post) {
                    p.likes = likes.clone();
                }
                if let Some(p) = self.post.as_mut().filter(|p| p.id == post) {
                    p.likes = likes;
                }
                self.error = None;
            }
            Event::CommentsUpdated { post, comments } => {
                if let Some(p) = self.posts.iter_mut().find(|p| p.id == post) {
                    p.comments = comments.clone();
                }
                if let Some(p) = self.post.as_mut().filter(|p| p.id == post) {
                    p.comments = comments;
                }
                self.error = None;
            }
            Event::PostFailed(failure) | Event::ProfileFailed(failure) => {
                self.error = Some(failure);
            }

            Event::ProfileLoaded(view) => {
                self.profile = Some(view.profile);
                self.error = None;
            }
            Event::ProfilesLoaded(views) => {
                self.profiles = views;
                self.error = None;
            }
            Event::ProfileUpdated(profile) => {
                self.profile = Some(profile);
                self.error = None;
            }
            Event::ReposLoaded(repos) => {
                self.repos = Some(repos);
                self.error = None;
            }
            Event::ProfileCleared => {
                self.profile = None;
                self.repos = None;
            }
            Event::AccountDeleted => {
                self.profile = None;
                self.posts.clear();
                self.post = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str) -> Post {
        Post::new(Uuid::new_v4(), "Ada", "http://a/img", text)
    }

    #[test]
    fn test_posts_loaded_replaces_and_clears_error() {
        let mut store = Store::new();
        store.error = Some(ApiFailure {
            status: 500,
            msg: "boom".to_string(),
        });

        store.dispatch(Event::PostsLoaded(vec![post("one"), post("two")]));

        assert_eq!(store.posts.len(), 2);
        assert!(store.error.is_none());
    }

    #[test]
    fn test_post_added_prepends() {
        let mut store = Store::new();
        store.dispatch(Event::PostsLoaded(vec![post("old")]));
        store.dispatch(Event::PostAdded(post("new")));

        assert_eq!(store.posts[0].text, "new");
        assert_eq!(store.posts.len(), 2);
    }

    #[test]
    fn test_post_deleted_removes_everywhere() {
        let mut store = Store::new();
        let p = post("gone");
        let id = p.id;
        store.dispatch(Event::PostsLoaded(vec![p.clone()]));
        store.dispatch(Event::PostLoaded(p));

        store.dispatch(Event::PostDeleted(id));

        assert!(store.posts.is_empty());
        assert!(store.post.is_none());
    }

    #[test]
    fn test_likes_updated_targets_one_post() {
        let mut store = Store::new();
        let a = post("a");
        let b = post("b");
        let a_id = a.id;
        store.dispatch(Event::PostsLoaded(vec![a, b]));

        store.dispatch(Event::LikesUpdated {
            post: a_id,
            likes: vec![Like {
                user: Uuid::new_v4(),
            }],
        });

        assert_eq!(store.posts[0].likes.len(), 1);
        assert!(store.posts[1].likes.is_empty());
    }

    #[test]
    fn test_failure_is_recorded() {
        let mut store = Store::new();
        store.dispatch(Event::PostFailed(ApiFailure {
            status: 404,
            msg: "No post found".to_string(),
        }));

        assert_eq!(store.error.as_ref().unwrap().status, 404);
    }

    #[test]
    fn test_account_deleted_clears_state() {
        let mut store = Store::new();
        store.dispatch(Event::PostsLoaded(vec![post("mine")]));
        store.dispatch(Event::ProfileUpdated(Profile::new(
            Uuid::new_v4(),
            "Developer",
            vec![],
        )));

        store.dispatch(Event::AccountDeleted);

        assert!(store.posts.is_empty());
        assert!(store.profile.is_none());
    }
}
