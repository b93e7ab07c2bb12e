//! Async navigation engine for SchoolNav.
//!
//! Wraps the pure logic in `schoolnav-logic` with the collaborators a real
//! deployment needs: grid providers and point repositories (async traits),
//! file and in-memory implementations, the backend point packet, an on-disk
//! point cache, the concurrent `Navigator`, and a caller-owned
//! `NavigationSession` for stepping through directions.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`cache`] | Versioned bincode point snapshot and caching repository |
//! | [`config`] | JSON loading of `EngineConfig` |
//! | [`error`] | `ProviderError` for collaborator failures |
//! | [`fs`] | File-backed grid provider and point repository |
//! | [`memory`] | In-memory providers |
//! | [`navigator`] | Concurrent per-segment navigation orchestrator |
//! | [`packet`] | Backend point packet decoding |
//! | [`provider`] | `FloorGridProvider` and `PointRepository` traits |
//! | [`session`] | Cursor over a navigation's maneuvers |

pub mod cache;
pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod navigator;
pub mod packet;
pub mod provider;
pub mod session;

pub use error::ProviderError;
pub use navigator::Navigator;
pub use provider::{FloorGridProvider, PointRepository};
pub use session::NavigationSession;
