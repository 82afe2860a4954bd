//! Domain types shared by the storage layer and the HTTP application.

pub mod id;
pub mod types;

pub use id::{InvalidJobPostId, JobPostId};
pub use types::{JobPost, JobPostPatch, NewJobPost};
