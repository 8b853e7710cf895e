//! Admin data loader.
//!
//! Fetches every tab in parallel for the dashboard, or a single tab after
//! a command changed it.

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;
use gymhub_common::AppResult;
use gymhub_db::{
    entities::{comment, feedback, gym, gym_request, post},
    repositories::{
        CommunityRepository, ContentRepository, FeedbackRepository, GymRepository,
        GymRequestRepository, ProfileRepository, ReportRepository, SuspensionRepository,
    },
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::debug;

use super::command::Tab;
use super::enrich::{
    CommunityRow, GymListRow, ReportRow, UserRow, enrich_communities, enrich_reports,
    enrich_users, gym_list_rows, member_user_ids,
};

/// Everything the admin panel shows.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSnapshot {
    pub users: Vec<UserRow>,
    pub communities: Vec<CommunityRow>,
    pub gyms: Vec<gym::Model>,
    pub gym_requests: Vec<gym_request::Model>,
    pub reports: Vec<ReportRow>,
    pub posts: Vec<post::Model>,
    pub comments: Vec<comment::Model>,
    pub feedback: Vec<feedback::Model>,
}

impl AdminSnapshot {
    /// Replace one tab's rows.
    pub fn apply(&mut self, data: TabData) {
        match data {
            TabData::Users(rows) => self.users = rows,
            TabData::Communities(rows) => self.communities = rows,
            TabData::Gyms(rows) => self.gyms = rows,
            TabData::GymRequests(rows) => self.gym_requests = rows,
            TabData::Reports(rows) => self.reports = rows,
            TabData::Posts(rows) => self.posts = rows,
            TabData::Comments(rows) => self.comments = rows,
            TabData::Feedback(rows) => self.feedback = rows,
        }
    }

    /// Rows of the gyms tab: pending requests, then gyms.
    #[must_use]
    pub fn gym_list(&self) -> Vec<GymListRow> {
        gym_list_rows(&self.gyms, &self.gym_requests)
    }
}

/// Rows of a single tab.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tab", content = "rows", rename_all = "snake_case")]
pub enum TabData {
    Users(Vec<UserRow>),
    Communities(Vec<CommunityRow>),
    Gyms(Vec<gym::Model>),
    GymRequests(Vec<gym_request::Model>),
    Reports(Vec<ReportRow>),
    Posts(Vec<post::Model>),
    Comments(Vec<comment::Model>),
    Feedback(Vec<feedback::Model>),
}

impl TabData {
    /// Tab these rows belong to.
    #[must_use]
    pub const fn tab(&self) -> Tab {
        match self {
            Self::Users(_) => Tab::Users,
            Self::Communities(_) => Tab::Communities,
            Self::Gyms(_) => Tab::Gyms,
            Self::GymRequests(_) => Tab::GymRequests,
            Self::Reports(_) => Tab::Reports,
            Self::Posts(_) => Tab::Posts,
            Self::Comments(_) => Tab::Comments,
            Self::Feedback(_) => Tab::Feedback,
        }
    }
}

/// Loads admin data from the store.
#[derive(Clone)]
pub struct AdminDataLoader {
    profile_repo: ProfileRepository,
    suspension_repo: SuspensionRepository,
    community_repo: CommunityRepository,
    gym_repo: GymRepository,
    gym_request_repo: GymRequestRepository,
    report_repo: ReportRepository,
    content_repo: ContentRepository,
    feedback_repo: FeedbackRepository,
    list_limit: u64,
}

impl AdminDataLoader {
    /// Create a loader. `list_limit` caps the post, comment and report lists.
    #[must_use]
    pub fn from_db(db: &Arc<DatabaseConnection>, list_limit: u64) -> Self {
        Self {
            profile_repo: ProfileRepository::new(Arc::clone(db)),
            suspension_repo: SuspensionRepository::new(Arc::clone(db)),
            community_repo: CommunityRepository::new(Arc::clone(db)),
            gym_repo: GymRepository::new(Arc::clone(db)),
            gym_request_repo: GymRequestRepository::new(Arc::clone(db)),
            report_repo: ReportRepository::new(Arc::clone(db)),
            content_repo: ContentRepository::new(Arc::clone(db)),
            feedback_repo: FeedbackRepository::new(Arc::clone(db)),
            list_limit,
        }
    }

    /// Load every tab concurrently. Fails if any tab fails.
    pub async fn load_all(&self) -> AppResult<AdminSnapshot> {
        let (users, communities, gyms, gym_requests, reports, posts, comments, feedback) = tokio::try_join!(
            self.load_users(),
            self.load_communities(),
            self.gym_repo.list(),
            self.gym_request_repo.list(None),
            self.load_reports(),
            self.content_repo.recent_posts(self.list_limit),
            self.content_repo.recent_comments(self.list_limit),
            self.feedback_repo.list(),
        )?;

        debug!(
            users = users.len(),
            communities = communities.len(),
            gyms = gyms.len(),
            gym_requests = gym_requests.len(),
            reports = reports.len(),
            "Admin snapshot loaded"
        );

        Ok(AdminSnapshot {
            users,
            communities,
            gyms,
            gym_requests,
            reports,
            posts,
            comments,
            feedback,
        })
    }

    /// Load one tab.
    pub async fn load_tab(&self, tab: Tab) -> AppResult<TabData> {
        Ok(match tab {
            Tab::Users => TabData::Users(self.load_users().await?),
            Tab::Communities => TabData::Communities(self.load_communities().await?),
            Tab::Gyms => TabData::Gyms(self.gym_repo.list().await?),
            Tab::GymRequests => TabData::GymRequests(self.gym_request_repo.list(None).await?),
            Tab::Reports => TabData::Reports(self.load_reports().await?),
            Tab::Posts => TabData::Posts(self.content_repo.recent_posts(self.list_limit).await?),
            Tab::Comments => {
                TabData::Comments(self.content_repo.recent_comments(self.list_limit).await?)
            }
            Tab::Feedback => TabData::Feedback(self.feedback_repo.list().await?),
        })
    }

    /// Load several tabs concurrently, e.g. the tabs a command touched.
    pub async fn load_tabs(&self, tabs: &[Tab]) -> AppResult<Vec<TabData>> {
        let mut tabs = tabs.to_vec();
        tabs.sort_unstable();
        tabs.dedup();
        try_join_all(tabs.into_iter().map(|tab| self.load_tab(tab))).await
    }

    async fn load_users(&self) -> AppResult<Vec<UserRow>> {
        let profiles = self.profile_repo.list(None).await?;
        let suspensions = self.suspension_repo.find_all_active().await?;
        Ok(enrich_users(profiles, suspensions, Utc::now().fixed_offset()))
    }

    async fn load_communities(&self) -> AppResult<Vec<CommunityRow>> {
        let communities = self.community_repo.list().await?;
        let ids: Vec<String> = communities.iter().map(|c| c.id.clone()).collect();

        let members = self.community_repo.find_members_for(&ids).await?;
        let post_counts = self.community_repo.count_posts_for(&ids).await?;
        let profiles = self
            .profile_repo
            .find_by_ids(&member_user_ids(&members))
            .await?;

        Ok(enrich_communities(communities, members, &post_counts, &profiles))
    }

    async fn load_reports(&self) -> AppResult<Vec<ReportRow>> {
        let reports = self.report_repo.list(self.list_limit).await?;

        let mut reporter_ids: Vec<String> = reports.iter().map(|r| r.reported_by.clone()).collect();
        reporter_ids.sort_unstable();
        reporter_ids.dedup();
        let reporters = self.profile_repo.find_by_ids(&reporter_ids).await?;

        Ok(enrich_reports(reports, &reporters))
    }
}
