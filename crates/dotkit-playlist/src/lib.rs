//! # dotkit-playlist
//!
//! The curated playlist: a flat file of `# title` / `url` pairs. URLs are
//! compared in normalized form so the same video is never listed twice.

pub mod append;
pub mod model;
pub mod native;
pub mod normalize;
pub mod organize;

pub use append::append_to_playlist;
pub use model::{Playlist, PlaylistEntry};
pub use normalize::{is_youtube_url, normalize_url, youtube_video_id};
pub use organize::{OrganizeReport, dedupe_playlist, organize_with_llm, sort_playlist};
