//! Bulk selection over a tab's rows.

use std::collections::HashSet;

use gymhub_db::entities::{comment, feedback, gym, gym_request, post};

use super::enrich::{CommunityRow, GymListRow, ReportRow, UserRow};

/// A row that can take part in a bulk selection.
pub trait Selectable {
    /// ID used in the selection, or `None` when the row cannot be selected.
    fn selection_id(&self) -> Option<&str>;
}

/// Set of selected row IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one ID. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Add one ID.
    pub fn select(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    /// Remove one ID.
    pub fn deselect(&mut self, id: &str) {
        self.ids.remove(id);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected IDs, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Keep only IDs for which `keep` returns true.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) {
        self.ids.retain(|id| keep(id));
    }

    /// Select every selectable visible row, or, when all of them are
    /// already selected, deselect exactly those rows.
    ///
    /// Selections outside `rows` are left untouched. A second call right
    /// after the first deselects the whole visible set, including rows
    /// that were selected before the first call.
    pub fn select_all_visible<'a, R, I>(&mut self, rows: I)
    where
        R: Selectable + 'a,
        I: IntoIterator<Item = &'a R>,
    {
        let visible: Vec<&str> = rows.into_iter().filter_map(Selectable::selection_id).collect();
        if visible.is_empty() {
            return;
        }

        if visible.iter().all(|id| self.ids.contains(*id)) {
            for id in visible {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(visible.into_iter().map(str::to_string));
        }
    }
}

impl Selectable for UserRow {
    fn selection_id(&self) -> Option<&str> {
        Some(&self.profile.id)
    }
}

impl Selectable for CommunityRow {
    fn selection_id(&self) -> Option<&str> {
        Some(&self.community.id)
    }
}

impl Selectable for ReportRow {
    fn selection_id(&self) -> Option<&str> {
        Some(&self.report.id)
    }
}

impl Selectable for gym::Model {
    fn selection_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl Selectable for gym_request::Model {
    fn selection_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

/// Pending requests on the gyms tab are reviewed from the requests tab,
/// so only gyms join bulk actions here.
impl Selectable for GymListRow {
    fn selection_id(&self) -> Option<&str> {
        match self {
            Self::Gym(g) => Some(&g.id),
            Self::Request(_) => None,
        }
    }
}

impl Selectable for post::Model {
    fn selection_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl Selectable for comment::Model {
    fn selection_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl Selectable for feedback::Model {
    fn selection_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, bool);

    impl Selectable for Row {
        fn selection_id(&self) -> Option<&str> {
            self.1.then_some(self.0)
        }
    }

    #[test]
    fn test_toggle() {
        let mut selection = Selection::new();
        assert!(selection.toggle("a"));
        assert!(selection.is_selected("a"));
        assert!(!selection.toggle("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_visible_round_trip() {
        let rows = [Row("a", true), Row("b", true), Row("c", false)];
        let mut selection = Selection::new();
        selection.select("outside");
        selection.select("a");

        selection.select_all_visible(&rows);
        assert_eq!(selection.ids(), vec!["a", "b", "outside"]);
        assert!(!selection.is_selected("c"));

        selection.select_all_visible(&rows);
        assert_eq!(selection.ids(), vec!["outside"]);

        selection.select_all_visible(&rows);
        selection.select_all_visible(&rows);
        assert_eq!(selection.ids(), vec!["outside"]);
    }

    #[test]
    fn test_second_call_drops_rows_selected_beforehand() {
        let rows = [Row("a", true), Row("b", true)];
        let mut selection = Selection::new();
        selection.select("a");

        selection.select_all_visible(&rows);
        selection.select_all_visible(&rows);

        assert!(!selection.is_selected("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_with_nothing_selectable_is_noop() {
        let rows = [Row("a", false)];
        let mut selection = Selection::new();
        selection.select("x");

        selection.select_all_visible(&rows);
        assert_eq!(selection.ids(), vec!["x"]);
    }

    #[test]
    fn test_retain() {
        let mut selection = Selection::new();
        selection.select("a");
        selection.select("b");
        selection.retain(|id| id == "b");
        assert_eq!(selection.ids(), vec!["b"]);
    }
}
