//! In-process gift-card account service: login sessions with expiring
//! tokens, exclusive card claiming, and merchant-notified charges.
//!
//! Persistence, transport and credential provisioning live outside this
//! crate; registries arrive pre-loaded and the clock is injected.

pub mod card;
pub mod clock;
pub mod error;
pub mod merchant;
pub mod money;
pub mod service;
pub mod session;
pub mod utils;
