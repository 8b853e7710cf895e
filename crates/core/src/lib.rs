//! Core business logic for gymhub.
//!
//! - [`services`]: one service per moderated entity, each enforcing the
//!   state rules of its table before writing.
//! - [`admin`]: the admin panel's workflow engine: typed commands, the
//!   dispatcher, the confirmation gate, the data loader with its
//!   enrichment pass, and the per-tab selection, filter and export state.

pub mod admin;
pub mod services;

pub use admin::{
    AdminCommand, AdminDataLoader, AdminSnapshot, CommandDispatcher, CommandOutcome,
    ConfirmationGate, ConfirmationPrompt, Tab,
};
pub use services::*;
