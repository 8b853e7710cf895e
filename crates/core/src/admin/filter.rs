//! Per-tab row filters.

use gymhub_db::entities::{
    comment,
    content_report::{ReportStatus, ReportSubject},
    feedback::{self, FeedbackPriority, FeedbackStatus},
    gym,
    gym_request::{self, GymRequestStatus},
    post,
};
use serde::{Deserialize, Serialize};

use super::command::Tab;
use super::enrich::{CommunityRow, GymListRow, ReportRow, UserRow};
use crate::services::GymVisibility;

/// A predicate over one tab's rows.
pub trait RowFilter<Row> {
    fn matches(&self, row: &Row) -> bool;
}

/// Rows that pass `filter`, in their original order.
pub fn apply_filter<'a, Row, F>(rows: &'a [Row], filter: &F) -> Vec<&'a Row>
where
    F: RowFilter<Row>,
{
    rows.iter().filter(|row| filter.matches(row)).collect()
}

/// Case-insensitive substring match of `query` against any field.
/// An empty or missing query matches everything.
fn query_matches(query: Option<&str>, fields: &[Option<&str>]) -> bool {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return true;
    };
    let needle = query.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn eq_ignore_case(expected: Option<&str>, actual: &str) -> bool {
    expected.is_none_or(|e| e.trim().eq_ignore_ascii_case(actual.trim()))
}

fn matches_opt<T: PartialEq>(expected: Option<T>, actual: T) -> bool {
    expected.is_none_or(|e| e == actual)
}

/// The filter of one exportable tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabFilter {
    Users(UserFilter),
    Communities(CommunityFilter),
    Gyms(GymFilter),
    GymRequests(GymRequestFilter),
    Reports(ReportFilter),
    Feedback(FeedbackFilter),
}

impl TabFilter {
    /// Tab the filter applies to.
    #[must_use]
    pub const fn tab(&self) -> Tab {
        match self {
            Self::Users(_) => Tab::Users,
            Self::Communities(_) => Tab::Communities,
            Self::Gyms(_) => Tab::Gyms,
            Self::GymRequests(_) => Tab::GymRequests,
            Self::Reports(_) => Tab::Reports,
            Self::Feedback(_) => Tab::Feedback,
        }
    }
}

// ========== Users ==========

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserFilter {
    pub query: Option<String>,
    pub admin_only: bool,
    pub banned: Option<bool>,
    pub suspended: Option<bool>,
}

impl RowFilter<UserRow> for UserFilter {
    fn matches(&self, row: &UserRow) -> bool {
        let p = &row.profile;
        query_matches(
            self.query.as_deref(),
            &[Some(p.full_name.as_str()), Some(p.email.as_str()), Some(p.id.as_str())],
        ) && (!self.admin_only || p.is_admin)
            && matches_opt(self.banned, p.is_banned)
            && matches_opt(self.suspended, row.is_suspended())
    }
}

// ========== Communities ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityStatus {
    Active,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    Public,
    Private,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityFilter {
    pub query: Option<String>,
    pub status: Option<CommunityStatus>,
    pub privacy: Option<Privacy>,
    pub community_type: Option<String>,
}

impl RowFilter<CommunityRow> for CommunityFilter {
    fn matches(&self, row: &CommunityRow) -> bool {
        let c = &row.community;
        let status = if c.is_active {
            CommunityStatus::Active
        } else {
            CommunityStatus::Suspended
        };
        let privacy = if c.is_private {
            Privacy::Private
        } else {
            Privacy::Public
        };

        query_matches(
            self.query.as_deref(),
            &[Some(c.name.as_str()), c.description.as_deref()],
        ) && matches_opt(self.status, status)
            && matches_opt(self.privacy, privacy)
            && eq_ignore_case(self.community_type.as_deref(), &c.community_type)
    }
}

// ========== Gyms ==========

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GymFilter {
    pub query: Option<String>,
    pub visibility: Option<GymVisibility>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl GymFilter {
    fn location_matches(&self, country: &str, city: &str) -> bool {
        eq_ignore_case(self.country.as_deref(), country) && eq_ignore_case(self.city.as_deref(), city)
    }
}

impl RowFilter<gym::Model> for GymFilter {
    fn matches(&self, g: &gym::Model) -> bool {
        let visibility = if g.is_hidden {
            GymVisibility::Hidden
        } else {
            GymVisibility::Shown
        };

        query_matches(
            self.query.as_deref(),
            &[
                Some(g.name.as_str()),
                Some(g.city.as_str()),
                Some(g.country.as_str()),
                g.address.as_deref(),
            ],
        ) && matches_opt(self.visibility, visibility)
            && self.location_matches(&g.country, &g.city)
    }
}

impl RowFilter<GymListRow> for GymFilter {
    fn matches(&self, row: &GymListRow) -> bool {
        match row {
            GymListRow::Gym(g) => RowFilter::<gym::Model>::matches(self, g),
            // Pending requests have no visibility yet.
            GymListRow::Request(r) => {
                self.visibility.is_none()
                    && query_matches(
                        self.query.as_deref(),
                        &[
                            Some(r.gym_name.as_str()),
                            Some(r.city.as_str()),
                            Some(r.country.as_str()),
                            r.address.as_deref(),
                        ],
                    )
                    && self.location_matches(&r.country, &r.city)
            }
        }
    }
}

// ========== Gym requests ==========

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GymRequestFilter {
    pub query: Option<String>,
    pub status: Option<GymRequestStatus>,
}

impl RowFilter<gym_request::Model> for GymRequestFilter {
    fn matches(&self, r: &gym_request::Model) -> bool {
        query_matches(
            self.query.as_deref(),
            &[
                Some(r.gym_name.as_str()),
                Some(r.city.as_str()),
                Some(r.country.as_str()),
                r.description.as_deref(),
            ],
        ) && matches_opt(self.status, r.status)
    }
}

// ========== Reports ==========

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportFilter {
    pub kind: Option<ReportSubject>,
    pub status: Option<ReportStatus>,
}

impl RowFilter<ReportRow> for ReportFilter {
    fn matches(&self, row: &ReportRow) -> bool {
        matches_opt(self.kind, row.report.subject_kind)
            && matches_opt(self.status, row.report.status)
    }
}

// ========== Feedback ==========

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedbackFilter {
    pub query: Option<String>,
    pub status: Option<FeedbackStatus>,
    pub priority: Option<FeedbackPriority>,
    pub feedback_type: Option<String>,
}

impl RowFilter<feedback::Model> for FeedbackFilter {
    fn matches(&self, f: &feedback::Model) -> bool {
        query_matches(
            self.query.as_deref(),
            &[
                Some(f.title.as_str()),
                Some(f.message.as_str()),
                f.admin_response.as_deref(),
            ],
        ) && matches_opt(self.status, f.status)
            && matches_opt(self.priority, f.priority)
            && eq_ignore_case(self.feedback_type.as_deref(), &f.feedback_type)
    }
}

// ========== Posts and comments ==========

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostFilter {
    pub query: Option<String>,
}

impl RowFilter<post::Model> for PostFilter {
    fn matches(&self, p: &post::Model) -> bool {
        query_matches(
            self.query.as_deref(),
            &[p.title.as_deref(), Some(p.content.as_str())],
        )
    }
}

impl RowFilter<comment::Model> for PostFilter {
    fn matches(&self, c: &comment::Model) -> bool {
        query_matches(self.query.as_deref(), &[Some(c.content.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gymhub_db::entities::profile;

    fn create_test_gym(name: &str, city: &str, is_hidden: bool) -> gym::Model {
        gym::Model {
            id: name.to_lowercase(),
            name: name.to_string(),
            country: "US".to_string(),
            city: city.to_string(),
            address: None,
            description: None,
            website: None,
            is_hidden,
            facilities: serde_json::json!([]),
            difficulty_levels: serde_json::json!([]),
            opening_hours: serde_json::json!({}),
            created_by: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_user(name: &str, is_admin: bool) -> UserRow {
        UserRow {
            profile: profile::Model {
                id: name.to_lowercase(),
                full_name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                token: None,
                is_admin,
                is_banned: false,
                created_at: Utc::now().into(),
                last_active_at: None,
            },
            suspension: None,
        }
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        assert!(query_matches(Some("BOUL"), &[Some("The Boulder Barn")]));
        assert!(query_matches(Some("  "), &[Some("anything")]));
        assert!(query_matches(None, &[None]));
        assert!(!query_matches(Some("x"), &[None, Some("abc")]));
    }

    #[test]
    fn test_gym_filter() {
        let gyms = vec![
            create_test_gym("Boulder Barn", "Austin", false),
            create_test_gym("Crux", "Austin", true),
            create_test_gym("Summit", "Dallas", false),
        ];

        let filter = GymFilter {
            city: Some("austin".to_string()),
            visibility: Some(GymVisibility::Shown),
            ..GymFilter::default()
        };
        let visible = apply_filter(&gyms, &filter);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Boulder Barn");

        let everything = apply_filter(&gyms, &GymFilter::default());
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn test_user_filter_admin_only_and_query() {
        let users = vec![create_test_user("Ada", true), create_test_user("Bo", false)];

        let admins = apply_filter(
            &users,
            &UserFilter {
                admin_only: true,
                ..UserFilter::default()
            },
        );
        assert_eq!(admins.len(), 1);

        let by_email = apply_filter(
            &users,
            &UserFilter {
                query: Some("bo@EXAMPLE".to_string()),
                ..UserFilter::default()
            },
        );
        assert_eq!(by_email[0].profile.full_name, "Bo");
    }

    #[test]
    fn test_filter_deserializes_partial_json() {
        let filter: FeedbackFilter =
            serde_json::from_str(r#"{"status":"in_progress","feedbackType":"bug"}"#)
                .unwrap_or_default();
        assert_eq!(filter.status, Some(FeedbackStatus::InProgress));
        assert_eq!(filter.feedback_type.as_deref(), Some("bug"));
        assert!(filter.query.is_none());
    }
}
