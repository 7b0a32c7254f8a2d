pub mod post;
pub mod profile;
pub mod user;

pub use post::{Comment, Like, Post};
pub use profile::{Education, Experience, Profile, ProfileView, SocialLinks};
pub use user::{User, UserSummary};
