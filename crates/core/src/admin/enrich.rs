//! Enrichment of loaded rows.
//!
//! Pure joins over rows the loader already fetched: no I/O happens here.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use gymhub_db::entities::{
    community,
    community_member::{self, MemberRole},
    content_report, gym,
    gym_request::{self, GymRequestStatus},
    profile, user_suspension,
};
use serde::Serialize;

/// A user with their current suspension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub profile: profile::Model,
    pub suspension: Option<user_suspension::Model>,
}

impl UserRow {
    /// Whether the user has a suspension in force.
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        self.suspension.is_some()
    }
}

/// Counts shown next to a community.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMetrics {
    pub member_count: u64,
    pub moderator_count: u64,
    pub post_count: u64,
}

/// A community member joined with their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub user_id: String,
    pub role: MemberRole,
    /// `None` when the profile no longer exists.
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub joined_at: DateTime<FixedOffset>,
}

/// A community with its metrics and members.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityRow {
    pub community: community::Model,
    pub metrics: CommunityMetrics,
    pub members: Vec<MemberProfile>,
}

/// A report with its reporter's name and email.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub report: content_report::Model,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
}

/// One row of the gyms tab: a live gym, or a pending request shown
/// alongside the gyms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "row", rename_all = "snake_case")]
pub enum GymListRow {
    Request(gym_request::Model),
    Gym(gym::Model),
}

impl GymListRow {
    /// Display name of the gym or requested gym.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Request(r) => &r.gym_name,
            Self::Gym(g) => &g.name,
        }
    }

    /// Country and city.
    #[must_use]
    pub fn location(&self) -> (&str, &str) {
        match self {
            Self::Request(r) => (&r.country, &r.city),
            Self::Gym(g) => (&g.country, &g.city),
        }
    }
}

/// Attach each user's current suspension.
///
/// Suspensions whose `expires_at` has passed are ignored even if the
/// expiry sweep has not deactivated them yet.
#[must_use]
pub fn enrich_users(
    profiles: Vec<profile::Model>,
    active_suspensions: Vec<user_suspension::Model>,
    now: DateTime<FixedOffset>,
) -> Vec<UserRow> {
    let mut current: HashMap<String, user_suspension::Model> = HashMap::new();
    for suspension in active_suspensions {
        if suspension.expires_at.is_some_and(|at| at <= now) {
            continue;
        }
        match current.get(&suspension.user_id) {
            Some(existing) if existing.created_at >= suspension.created_at => {}
            _ => {
                current.insert(suspension.user_id.clone(), suspension);
            }
        }
    }

    profiles
        .into_iter()
        .map(|profile| {
            let suspension = current.remove(&profile.id);
            UserRow {
                profile,
                suspension,
            }
        })
        .collect()
}

/// Attach metrics and member profiles to communities.
#[must_use]
pub fn enrich_communities(
    communities: Vec<community::Model>,
    members: Vec<community_member::Model>,
    post_counts: &[(String, i64)],
    profiles: &[profile::Model],
) -> Vec<CommunityRow> {
    let profiles: HashMap<&str, &profile::Model> =
        profiles.iter().map(|p| (p.id.as_str(), p)).collect();
    let post_counts: HashMap<&str, u64> = post_counts
        .iter()
        .map(|(id, count)| (id.as_str(), u64::try_from(*count).unwrap_or(0)))
        .collect();

    let mut by_community: HashMap<String, Vec<community_member::Model>> = HashMap::new();
    for member in members {
        by_community
            .entry(member.community_id.clone())
            .or_default()
            .push(member);
    }

    communities
        .into_iter()
        .map(|community| {
            let mut members = by_community.remove(&community.id).unwrap_or_default();
            members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));

            let metrics = CommunityMetrics {
                member_count: members.len() as u64,
                moderator_count: members.iter().filter(|m| m.role.can_moderate()).count() as u64,
                post_count: post_counts.get(community.id.as_str()).copied().unwrap_or(0),
            };

            let members = members
                .into_iter()
                .map(|m| {
                    let profile = profiles.get(m.user_id.as_str());
                    MemberProfile {
                        full_name: profile.map(|p| p.full_name.clone()),
                        email: profile.map(|p| p.email.clone()),
                        user_id: m.user_id,
                        role: m.role,
                        joined_at: m.joined_at,
                    }
                })
                .collect();

            CommunityRow {
                community,
                metrics,
                members,
            }
        })
        .collect()
}

/// Attach reporter names and emails to reports.
#[must_use]
pub fn enrich_reports(
    reports: Vec<content_report::Model>,
    reporters: &[profile::Model],
) -> Vec<ReportRow> {
    let reporters: HashMap<&str, &profile::Model> =
        reporters.iter().map(|p| (p.id.as_str(), p)).collect();

    reports
        .into_iter()
        .map(|report| {
            let reporter = reporters.get(report.reported_by.as_str());
            ReportRow {
                reporter_name: reporter.map(|p| p.full_name.clone()),
                reporter_email: reporter.map(|p| p.email.clone()),
                report,
            }
        })
        .collect()
}

/// Compose the gyms tab: pending requests first, then gyms.
#[must_use]
pub fn gym_list_rows(gyms: &[gym::Model], requests: &[gym_request::Model]) -> Vec<GymListRow> {
    requests
        .iter()
        .filter(|r| r.status == GymRequestStatus::Pending)
        .cloned()
        .map(GymListRow::Request)
        .chain(gyms.iter().cloned().map(GymListRow::Gym))
        .collect()
}

/// Distinct user IDs referenced by members, for the profile lookup.
#[must_use]
pub fn member_user_ids(members: &[community_member::Model]) -> Vec<String> {
    let mut ids: Vec<String> = members.iter().map(|m| m.user_id.clone()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use gymhub_db::entities::content_report::{ReportStatus, ReportSubject};

    fn create_test_profile(id: &str, name: &str) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            full_name: name.to_string(),
            email: format!("{id}@example.com"),
            token: None,
            is_admin: false,
            is_banned: false,
            created_at: Utc::now().into(),
            last_active_at: None,
        }
    }

    fn create_test_suspension(
        id: &str,
        user_id: &str,
        expires_at: Option<DateTime<FixedOffset>>,
    ) -> user_suspension::Model {
        user_suspension::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            reason: "spam".to_string(),
            notes: None,
            suspended_by: "admin1".to_string(),
            expires_at,
            is_active: true,
            created_at: Utc::now().into(),
            lifted_at: None,
            lifted_by: None,
        }
    }

    fn create_test_member(community_id: &str, user_id: &str, role: MemberRole) -> community_member::Model {
        community_member::Model {
            id: format!("{community_id}-{user_id}"),
            community_id: community_id.to_string(),
            user_id: user_id.to_string(),
            role,
            joined_at: Utc::now().into(),
        }
    }

    fn create_test_community(id: &str) -> community::Model {
        community::Model {
            id: id.to_string(),
            name: format!("Community {id}"),
            description: None,
            rules: None,
            is_private: false,
            is_active: true,
            gym_id: None,
            community_type: "general".to_string(),
            created_by: "u1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_enrich_users_ignores_expired_suspensions() {
        let now = Utc::now().fixed_offset();
        let profiles = vec![
            create_test_profile("u1", "Ada"),
            create_test_profile("u2", "Bo"),
            create_test_profile("u3", "Cy"),
        ];
        let suspensions = vec![
            create_test_suspension("s1", "u1", None),
            create_test_suspension("s2", "u2", Some(now - Duration::hours(1))),
            create_test_suspension("s3", "u3", Some(now + Duration::hours(1))),
        ];

        let rows = enrich_users(profiles, suspensions, now);

        assert!(rows[0].is_suspended());
        assert!(!rows[1].is_suspended());
        assert!(rows[2].is_suspended());
    }

    #[test]
    fn test_enrich_communities_metrics_and_profiles() {
        let members = vec![
            create_test_member("c1", "u1", MemberRole::Admin),
            create_test_member("c1", "u2", MemberRole::Member),
            create_test_member("c1", "ghost", MemberRole::Moderator),
        ];
        let profiles = vec![
            create_test_profile("u1", "Ada"),
            create_test_profile("u2", "Bo"),
        ];
        let post_counts = vec![("c1".to_string(), 7)];

        let rows = enrich_communities(
            vec![create_test_community("c1"), create_test_community("c2")],
            members,
            &post_counts,
            &profiles,
        );

        assert_eq!(
            rows[0].metrics,
            CommunityMetrics {
                member_count: 3,
                moderator_count: 2,
                post_count: 7,
            }
        );
        let ghost = rows[0].members.iter().find(|m| m.user_id == "ghost");
        assert_eq!(ghost.and_then(|m| m.full_name.clone()), None);
        assert_eq!(rows[1].metrics, CommunityMetrics::default());
    }

    #[test]
    fn test_enrich_reports_joins_reporter() {
        let report = content_report::Model {
            id: "r1".to_string(),
            subject_kind: ReportSubject::Post,
            subject_id: "p1".to_string(),
            reported_by: "u1".to_string(),
            reason: "spam".to_string(),
            details: None,
            status: ReportStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now().into(),
        };

        let rows = enrich_reports(vec![report], &[create_test_profile("u1", "Ada")]);

        assert_eq!(rows[0].reporter_name.as_deref(), Some("Ada"));
        assert_eq!(rows[0].reporter_email.as_deref(), Some("u1@example.com"));
    }

    #[test]
    fn test_member_user_ids_dedup() {
        let members = vec![
            create_test_member("c1", "u2", MemberRole::Member),
            create_test_member("c2", "u2", MemberRole::Member),
            create_test_member("c2", "u1", MemberRole::Admin),
        ];
        assert_eq!(member_user_ids(&members), vec!["u1", "u2"]);
    }
}
