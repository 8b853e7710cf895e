//! Admin panel workflow.
//!
//! Commands decode from JSON into [`AdminCommand`], pass the
//! [`ConfirmationGate`] and run through the [`CommandDispatcher`]. The
//! [`AdminDataLoader`] fetches and enriches tab data; [`tab::TabState`]
//! holds a tab's filter, selection and sort.

#![allow(missing_docs)]

pub mod command;
pub mod confirmation;
pub mod dispatcher;
pub mod enrich;
pub mod export;
pub mod filter;
pub mod loader;
pub mod selection;
pub mod tab;

pub use command::{AdminCommand, ConfirmationPrompt, PromptVariant, Tab};
pub use confirmation::{ConfirmationGate, OpenedConfirmation};
pub use dispatcher::{CommandDispatcher, CommandOutcome};
pub use enrich::{CommunityMetrics, CommunityRow, GymListRow, MemberProfile, ReportRow, UserRow};
pub use export::{CsvRecord, export_filename, export_tab};
pub use filter::{RowFilter, TabFilter};
pub use loader::{AdminDataLoader, AdminSnapshot, TabData};
pub use selection::{Selectable, Selection};
