//! # WE-DJ Transition Client (wedj-client)
//!
//! Talks to the render backend that produces DJ transitions.
//!
//! **Purpose:** Submit a free-text song search, follow the resulting job
//! until its transition audio and thumbnails are available, and expose the
//! job state to a front end. Also drives the gated playlist batch render.
//!
//! **Architecture:** [`backend::RenderBackend`] contract with an HTTP
//! implementation (reqwest), a generation-tagged [`TransitionCoordinator`]
//! publishing snapshots over a `tokio::sync::watch` channel, and an
//! in-memory [`media::MediaStore`] handing out transient media URLs.

pub mod backend;
pub mod coordinator;
pub mod error;
pub mod media;
pub mod playlist;

pub use backend::{HttpRenderBackend, RenderBackend};
pub use coordinator::{JobTicket, PollPolicy, TransitionCoordinator, TransitionView};
pub use error::{BackendError, ClientError, ClientResult};
pub use playlist::{PlaylistBuilder, PlaylistGate, PlaylistMix};

/// Version, commit, build time and profile, as stamped by `build.rs`
pub fn build_summary() -> String {
    format!(
        "v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_stamp_is_utc() {
        let stamp = env!("BUILD_TIMESTAMP");
        assert!(stamp.ends_with('Z'), "{}", stamp);
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "{}", stamp);
        assert!(!env!("GIT_HASH").is_empty());
        assert!(build_summary().starts_with(concat!("v", env!("CARGO_PKG_VERSION"), " [")));
    }
}
