//! Tab state and its reducer.
//!
//! Each admin tab keeps its rows, filter, selection and sort order in one
//! [`TabState`]. All changes go through [`TabState::reduce`].

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use gymhub_db::entities::{comment, feedback, gym, gym_request, post};
use serde::{Deserialize, Serialize};

use super::enrich::{CommunityRow, GymListRow, ReportRow, UserRow};
use super::filter::RowFilter;
use super::selection::{Selectable, Selection};

/// A row shown in a tab.
pub trait TabRow: Selectable {
    fn created_at(&self) -> DateTime<FixedOffset>;

    /// Text used when sorting by name.
    fn label(&self) -> &str;
}

/// Column a tab can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    Name,
}

/// Current sort of a tab. Newest first by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

/// A change to a tab.
#[derive(Debug, Clone)]
pub enum TabAction<Row, F> {
    /// Fresh rows from the loader.
    Loaded(Vec<Row>),
    SetFilter(F),
    ToggleRow(String),
    ToggleAllVisible,
    ClearSelection,
    /// Sort by a field; choosing the current field flips the direction.
    SortBy(SortField),
}

/// State of one admin tab.
#[derive(Debug, Clone)]
pub struct TabState<Row, F> {
    rows: Vec<Row>,
    filter: F,
    selection: Selection,
    sort: Sort,
}

impl<Row, F> Default for TabState<Row, F>
where
    F: Default,
{
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            filter: F::default(),
            selection: Selection::new(),
            sort: Sort::default(),
        }
    }
}

impl<Row, F> TabState<Row, F>
where
    Row: TabRow,
    F: RowFilter<Row>,
{
    /// Apply one action.
    pub fn reduce(&mut self, action: TabAction<Row, F>) {
        match action {
            TabAction::Loaded(rows) => {
                self.rows = rows;
                self.prune_selection();
            }
            TabAction::SetFilter(filter) => {
                self.filter = filter;
                self.prune_selection();
            }
            TabAction::ToggleRow(id) => {
                let visible = project(&self.rows, &self.filter, self.sort);
                if visible.iter().any(|row| row.selection_id() == Some(id.as_str())) {
                    self.selection.toggle(&id);
                }
            }
            TabAction::ToggleAllVisible => {
                let visible = project(&self.rows, &self.filter, self.sort);
                self.selection.select_all_visible(visible);
            }
            TabAction::ClearSelection => self.selection.clear(),
            TabAction::SortBy(field) => {
                self.sort = if self.sort.field == field {
                    Sort {
                        field,
                        descending: !self.sort.descending,
                    }
                } else {
                    Sort {
                        field,
                        descending: field == SortField::CreatedAt,
                    }
                };
            }
        }
    }

    /// Filtered and sorted rows.
    #[must_use]
    pub fn visible(&self) -> Vec<&Row> {
        project(&self.rows, &self.filter, self.sort)
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub const fn filter(&self) -> &F {
        &self.filter
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub const fn sort(&self) -> Sort {
        self.sort
    }

    /// Drop selected IDs that are no longer visible, so a bulk action
    /// never touches rows the admin cannot see.
    fn prune_selection(&mut self) {
        let visible: Vec<String> = project(&self.rows, &self.filter, self.sort)
            .into_iter()
            .filter_map(|row| row.selection_id().map(str::to_string))
            .collect();
        self.selection.retain(|id| visible.iter().any(|v| v == id));
    }
}

fn project<'a, Row, F>(rows: &'a [Row], filter: &F, sort: Sort) -> Vec<&'a Row>
where
    Row: TabRow,
    F: RowFilter<Row>,
{
    let mut visible: Vec<&Row> = rows.iter().filter(|row| filter.matches(row)).collect();
    visible.sort_by(|a, b| {
        let ordering = match sort.field {
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortField::Name => compare_labels(a.label(), b.label()),
        };
        if sort.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    visible
}

fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl TabRow for UserRow {
    fn created_at(&self) -> DateTime<FixedOffset> {
        self.profile.created_at
    }

    fn label(&self) -> &str {
        &self.profile.full_name
    }
}

impl TabRow for CommunityRow {
    fn created_at(&self) -> DateTime<FixedOffset> {
        self.community.created_at
    }

    fn label(&self) -> &str {
        &self.community.name
    }
}

impl TabRow for GymListRow {
    fn created_at(&self) -> DateTime<FixedOffset> {
        match self {
            Self::Gym(g) => g.created_at,
            Self::Request(r) => r.created_at,
        }
    }

    fn label(&self) -> &str {
        self.name()
    }
}

impl TabRow for gym::Model {
    fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    fn label(&self) -> &str {
        &self.name
    }
}

impl TabRow for gym_request::Model {
    fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    fn label(&self) -> &str {
        &self.gym_name
    }
}

impl TabRow for ReportRow {
    fn created_at(&self) -> DateTime<FixedOffset> {
        self.report.created_at
    }

    fn label(&self) -> &str {
        &self.report.reason
    }
}

impl TabRow for post::Model {
    fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.content)
    }
}

impl TabRow for comment::Model {
    fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    fn label(&self) -> &str {
        &self.content
    }
}

impl TabRow for feedback::Model {
    fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    fn label(&self) -> &str {
        &self.title
    }
}
