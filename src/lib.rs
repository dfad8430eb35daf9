//! # Pulsewire
//!
//! Client-side data layer for an AI news aggregator: categories with their
//! latest articles, short editorial "pulses", and per-user bookmarks, all
//! read from a hosted PostgREST service.
//!
//! ## Architecture
//!
//! ```text
//! RemoteService → Normalizer → Aggregator / QueryEngine → Views
//!                                  ↑
//!        SessionStore → MutationCoordinator (optimistic bookmarks)
//! ```
//!
//! - [`remote`]: Query and mutation interfaces plus the HTTP implementation
//! - [`normalizer`]: Turns inconsistently shaped rows into domain models
//! - [`aggregator`]: Dashboard totals derived from categories
//! - [`query`]: Search and sort over normalized collections
//! - [`mutation`]: Save/unsave with rollback on failure
//! - [`session`]: The current user and change notifications
//! - [`view`]: Screen-level state with stale-response protection
//!
//! ## Quick Start
//!
//! ```bash
//! # Categories and totals
//! pulsewire home
//!
//! # Most viewed pulses about agents
//! pulsewire pulses --search agents --sort popular
//!
//! # Bookmark a pulse (requires [identity] in the config)
//! pulsewire toggle 42
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the session,
/// remote service, fetcher, normalizer and mutation coordinator.
pub mod app;

/// Dashboard statistics derived from normalized categories.
pub mod aggregator;

/// Command-line interface using clap.
///
/// - `home [--search]` - Categories and dashboard totals
/// - `pulses [--search] [--sort]` - The pulse feed
/// - `pulse <slug>` - A single pulse
/// - `articles [--page] [--per-page]` - Recent articles
/// - `saved` - Bookmarks of the signed-in user
/// - `toggle <pulse-id>...` - Save or unsave pulses
pub mod cli;

/// Configuration loaded from `~/.config/pulsewire/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Article`](domain::Article), [`Category`](domain::Category),
///   [`Pulse`](domain::Pulse)
/// - [`SavedRelation`](domain::SavedRelation): a user-to-pulse bookmark
/// - [`Session`](domain::Session): the authenticated identity
pub mod domain;

/// Typed reads over the remote service, with fetch generations for
/// discarding superseded responses.
pub mod fetcher;

/// Optimistic bookmark toggling.
pub mod mutation;

/// Row normalization with central default policies.
pub mod normalizer;

/// Client-side search and sort.
pub mod query;

/// Remote query/mutation interfaces and the PostgREST client.
pub mod remote;

/// Session tracking and change subscriptions.
pub mod session;

/// Screen-level view state.
pub mod view;

#[cfg(test)]
mod testing;
