//! CSV exports of the admin tabs.

use chrono::{DateTime, FixedOffset, NaiveDate};
use gymhub_common::csv::write_csv;
use gymhub_db::entities::{feedback, gym, gym_request};
use serde_json::Value;

use super::command::Tab;
use super::enrich::{CommunityRow, ReportRow, UserRow};
use super::filter::{RowFilter, TabFilter, apply_filter};
use super::loader::AdminSnapshot;

/// A row that can be written as one CSV record.
pub trait CsvRecord {
    /// Column names, in record order.
    const HEADER: &'static [&'static str];

    fn record(&self) -> Vec<String>;
}

/// Serialize rows with the header of their type.
pub fn to_csv<'a, R, I>(rows: I) -> String
where
    R: CsvRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    write_csv(R::HEADER, rows.into_iter().map(CsvRecord::record))
}

/// Export file name for a tab, e.g. `gym_requests_2024-05-01.csv`.
#[must_use]
pub fn export_filename(tab: Tab, date: NaiveDate) -> String {
    format!("{}_{}.csv", tab.as_str(), date.format("%Y-%m-%d"))
}

/// Export the filtered view of one tab of a snapshot.
#[must_use]
pub fn export_tab(snapshot: &AdminSnapshot, filter: &TabFilter) -> String {
    match filter {
        TabFilter::Users(f) => filtered_csv(&snapshot.users, f),
        TabFilter::Communities(f) => filtered_csv(&snapshot.communities, f),
        TabFilter::Gyms(f) => filtered_csv(&snapshot.gyms, f),
        TabFilter::GymRequests(f) => filtered_csv(&snapshot.gym_requests, f),
        TabFilter::Reports(f) => filtered_csv(&snapshot.reports, f),
        TabFilter::Feedback(f) => filtered_csv(&snapshot.feedback, f),
    }
}

fn filtered_csv<R, F>(rows: &[R], filter: &F) -> String
where
    R: CsvRecord,
    F: RowFilter<R>,
{
    to_csv(apply_filter(rows, filter))
}

fn timestamp(at: DateTime<FixedOffset>) -> String {
    at.to_rfc3339()
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn yes_no(value: bool) -> String {
    String::from(if value { "yes" } else { "no" })
}

/// JSON arrays become `a; b; c`, other values their JSON text.
fn json_list(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl CsvRecord for UserRow {
    const HEADER: &'static [&'static str] = &[
        "id",
        "full_name",
        "email",
        "is_admin",
        "is_banned",
        "suspended",
        "suspension_expires_at",
        "created_at",
        "last_active_at",
    ];

    fn record(&self) -> Vec<String> {
        let p = &self.profile;
        vec![
            p.id.clone(),
            p.full_name.clone(),
            p.email.clone(),
            yes_no(p.is_admin),
            yes_no(p.is_banned),
            yes_no(self.is_suspended()),
            self.suspension
                .as_ref()
                .and_then(|s| s.expires_at)
                .map(timestamp)
                .unwrap_or_default(),
            timestamp(p.created_at),
            p.last_active_at.map(timestamp).unwrap_or_default(),
        ]
    }
}

impl CsvRecord for CommunityRow {
    const HEADER: &'static [&'static str] = &[
        "id",
        "name",
        "community_type",
        "is_private",
        "is_active",
        "member_count",
        "moderator_count",
        "post_count",
        "created_at",
    ];

    fn record(&self) -> Vec<String> {
        let c = &self.community;
        vec![
            c.id.clone(),
            c.name.clone(),
            c.community_type.clone(),
            yes_no(c.is_private),
            yes_no(c.is_active),
            self.metrics.member_count.to_string(),
            self.metrics.moderator_count.to_string(),
            self.metrics.post_count.to_string(),
            timestamp(c.created_at),
        ]
    }
}

impl CsvRecord for gym::Model {
    const HEADER: &'static [&'static str] = &[
        "id",
        "name",
        "country",
        "city",
        "address",
        "website",
        "is_hidden",
        "facilities",
        "difficulty_levels",
        "created_at",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.country.clone(),
            self.city.clone(),
            opt(self.address.as_deref()),
            opt(self.website.as_deref()),
            yes_no(self.is_hidden),
            json_list(&self.facilities),
            json_list(&self.difficulty_levels),
            timestamp(self.created_at),
        ]
    }
}

impl CsvRecord for gym_request::Model {
    const HEADER: &'static [&'static str] = &[
        "id",
        "gym_name",
        "country",
        "city",
        "status",
        "requested_by",
        "reviewed_by",
        "reviewed_at",
        "admin_notes",
        "approved_gym_id",
        "created_at",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.gym_name.clone(),
            self.country.clone(),
            self.city.clone(),
            self.status.as_str().to_string(),
            self.requested_by.clone(),
            opt(self.reviewed_by.as_deref()),
            self.reviewed_at.map(timestamp).unwrap_or_default(),
            opt(self.admin_notes.as_deref()),
            opt(self.approved_gym_id.as_deref()),
            timestamp(self.created_at),
        ]
    }
}

impl CsvRecord for ReportRow {
    const HEADER: &'static [&'static str] = &[
        "id",
        "subject_kind",
        "subject_id",
        "reason",
        "details",
        "status",
        "reporter_name",
        "reporter_email",
        "created_at",
    ];

    fn record(&self) -> Vec<String> {
        let r = &self.report;
        vec![
            r.id.clone(),
            r.subject_kind.as_str().to_string(),
            r.subject_id.clone(),
            r.reason.clone(),
            opt(r.details.as_deref()),
            r.status.as_str().to_string(),
            opt(self.reporter_name.as_deref()),
            opt(self.reporter_email.as_deref()),
            timestamp(r.created_at),
        ]
    }
}

impl CsvRecord for feedback::Model {
    const HEADER: &'static [&'static str] = &[
        "id",
        "feedback_type",
        "title",
        "message",
        "status",
        "priority",
        "admin_response",
        "created_at",
        "updated_at",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.feedback_type.clone(),
            self.title.clone(),
            self.message.clone(),
            self.status.as_str().to_string(),
            self.priority.as_str().to_string(),
            opt(self.admin_response.as_deref()),
            timestamp(self.created_at),
            self.updated_at.map(timestamp).unwrap_or_default(),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::admin::filter::{FeedbackFilter, GymFilter};
    use crate::services::GymVisibility;
    use gymhub_common::csv::parse_csv;
    use gymhub_db::entities::feedback::{FeedbackPriority, FeedbackStatus};
    use serde_json::json;

    fn create_test_feedback(
        id: &str,
        status: FeedbackStatus,
        priority: FeedbackPriority,
    ) -> feedback::Model {
        feedback::Model {
            id: id.to_string(),
            user_id: Some("u1".to_string()),
            feedback_type: "bug".to_string(),
            title: format!("Feedback {id}"),
            message: "Route setter app crashes".to_string(),
            status,
            priority,
            admin_response: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_gym(id: &str, name: &str) -> gym::Model {
        gym::Model {
            id: id.to_string(),
            name: name.to_string(),
            country: "US".to_string(),
            city: "Austin".to_string(),
            address: Some("1 Main St, Suite \"B\"".to_string()),
            description: None,
            website: None,
            is_hidden: false,
            facilities: json!(["lead", "bouldering"]),
            difficulty_levels: json!([]),
            opening_hours: json!({}),
            created_by: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_gym_export_round_trips() {
        let gyms = vec![
            create_test_gym("g1", "Boulder \"Barn\""),
            create_test_gym("g2", "Crux"),
        ];
        let csv = to_csv(&gyms);
        let parsed = parse_csv(&csv).unwrap();

        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], gym::Model::HEADER);
        assert_eq!(parsed[1][1], "Boulder \"Barn\"");
        assert_eq!(parsed[1][4], "1 Main St, Suite \"B\"");
        assert_eq!(parsed[1][7], "lead; bouldering");
    }

    #[test]
    fn test_export_tab_applies_query() {
        let snapshot = AdminSnapshot {
            gyms: vec![create_test_gym("g1", "Crux"), create_test_gym("g2", "Apex")],
            ..AdminSnapshot::default()
        };

        let filter = TabFilter::Gyms(GymFilter {
            query: Some("apex".to_string()),
            ..GymFilter::default()
        });
        let csv = export_tab(&snapshot, &filter);
        let parsed = parse_csv(&csv).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1][0], "g2");
    }

    #[test]
    fn test_export_tab_applies_status_and_priority() {
        let snapshot = AdminSnapshot {
            feedback: vec![
                create_test_feedback("f1", FeedbackStatus::Open, FeedbackPriority::High),
                create_test_feedback("f2", FeedbackStatus::Resolved, FeedbackPriority::High),
                create_test_feedback("f3", FeedbackStatus::Open, FeedbackPriority::Low),
                create_test_feedback("f4", FeedbackStatus::Open, FeedbackPriority::High),
            ],
            ..AdminSnapshot::default()
        };

        let by_status = TabFilter::Feedback(FeedbackFilter {
            status: Some(FeedbackStatus::Open),
            ..FeedbackFilter::default()
        });
        let parsed = parse_csv(&export_tab(&snapshot, &by_status)).unwrap();
        assert_eq!(parsed.len(), 4);

        let by_both = TabFilter::Feedback(FeedbackFilter {
            status: Some(FeedbackStatus::Open),
            priority: Some(FeedbackPriority::High),
            ..FeedbackFilter::default()
        });
        let parsed = parse_csv(&export_tab(&snapshot, &by_both)).unwrap();
        let ids: Vec<&str> = parsed[1..].iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["f1", "f4"]);
    }

    #[test]
    fn test_export_gyms_by_visibility() {
        let mut hidden = create_test_gym("g2", "Apex");
        hidden.is_hidden = true;
        let snapshot = AdminSnapshot {
            gyms: vec![create_test_gym("g1", "Crux"), hidden],
            ..AdminSnapshot::default()
        };

        let filter = TabFilter::Gyms(GymFilter {
            visibility: Some(GymVisibility::Hidden),
            ..GymFilter::default()
        });
        let parsed = parse_csv(&export_tab(&snapshot, &filter)).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1][0], "g2");
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let filter = TabFilter::Feedback(FeedbackFilter::default());
        let csv = export_tab(&AdminSnapshot::default(), &filter);
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            export_filename(Tab::GymRequests, date),
            "gym_requests_2024-05-01.csv"
        );
    }

    #[test]
    fn test_json_list() {
        assert_eq!(json_list(&json!(["a", 1])), "a; 1");
        assert_eq!(json_list(&Value::Null), "");
        assert_eq!(json_list(&json!({"mon": "9-5"})), r#"{"mon":"9-5"}"#);
    }
}
