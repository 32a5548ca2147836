// Report domain model - queries, per-kind payloads, rendered sections and the report flow
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    UserOverview,
    AppointmentsAnalytics,
    DoctorAvailability,
    CommunityEngagement,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown report kind '{0}'")]
pub struct UnknownReportKind(pub String);

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::UserOverview,
        ReportKind::AppointmentsAnalytics,
        ReportKind::DoctorAvailability,
        ReportKind::CommunityEngagement,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::UserOverview => "user-overview",
            ReportKind::AppointmentsAnalytics => "appointments-analytics",
            ReportKind::DoctorAvailability => "doctor-availability",
            ReportKind::CommunityEngagement => "community-engagement",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::UserOverview => "User Overview Report",
            ReportKind::AppointmentsAnalytics => "Appointments Analytics Report",
            ReportKind::DoctorAvailability => "Doctor Availability Report",
            ReportKind::CommunityEngagement => "Community Engagement Report",
        }
    }

    /// Key under which some backend versions nest the payload body
    fn payload_key(&self) -> &'static str {
        match self {
            ReportKind::UserOverview => "userOverview",
            ReportKind::AppointmentsAnalytics => "appointmentsAnalytics",
            ReportKind::DoctorAvailability => "doctorAvailability",
            ReportKind::CommunityEngagement => "communityEngagement",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportKind {
    type Err = UnknownReportKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownReportKind(s.to_string()))
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("start date {start} is after end date {end}")]
pub struct InvalidDateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Parameters of a single report fetch. Any change means a new fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub kind: ReportKind,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

impl ReportQuery {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            start_date: None,
            end_date: None,
            search: None,
        }
    }

    pub fn with_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn validate(&self) -> Result<(), InvalidDateRange> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(InvalidDateRange { start, end }),
            _ => Ok(()),
        }
    }

    /// Query string pairs in the backend's parameter naming
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }

    pub fn describe_range(&self) -> Option<String> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(format!("Period: {} to {}", start, end)),
            (Some(start), None) => Some(format!("Period: from {}", start)),
            (None, Some(end)) => Some(format!("Period: until {}", end)),
            (None, None) => None,
        }
    }
}

/// A loosely-typed scalar from the reporting backend.
///
/// Counts arrive as numbers or numeric strings depending on the aggregation,
/// and any field may be null or missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Scalar {
    #[default]
    Missing,
    Number(f64),
    Text(String),
    Flag(bool),
}

impl Scalar {
    pub fn is_missing(&self) -> bool {
        matches!(self, Scalar::Missing)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Missing => Ok(()),
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Scalar::Number(n) => write!(f, "{:.2}", n),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Flag(true) => f.write_str("Yes"),
            Scalar::Flag(false) => f.write_str("No"),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde_json::Value;

        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Scalar::Missing,
            Value::Bool(b) => Scalar::Flag(b),
            Value::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or_default(),
            Value::String(s) => Scalar::Text(s),
            other => Scalar::Text(other.to_string()),
        })
    }
}

/// null and missing collapse to the default value
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// null arrays and null rows are both dropped
fn rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let rows = Option::<Vec<Option<T>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(rows.into_iter().flatten().collect())
}

// ---------------------------------------------------------------------------
// user-overview

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserOverview {
    #[serde(default, deserialize_with = "nullable")]
    pub summary: UserSummary,
    #[serde(default, deserialize_with = "rows")]
    pub users: Vec<UserRow>,
    #[serde(default, rename = "roleDistribution", alias = "role_distribution", deserialize_with = "rows")]
    pub role_distribution: Vec<RoleCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSummary {
    #[serde(default, alias = "totalUsers")]
    pub total_users: Scalar,
    #[serde(default, alias = "activeUsers")]
    pub active_users: Scalar,
    #[serde(default, alias = "newUsers")]
    pub new_users: Scalar,
    #[serde(default, alias = "totalDoctors")]
    pub total_doctors: Scalar,
    #[serde(default, alias = "totalPatients")]
    pub total_patients: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRow {
    #[serde(default, alias = "fullName", alias = "full_name")]
    pub name: Scalar,
    #[serde(default)]
    pub email: Scalar,
    #[serde(default)]
    pub role: Scalar,
    #[serde(default)]
    pub status: Scalar,
    #[serde(default, alias = "createdAt")]
    pub created_at: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleCount {
    #[serde(default)]
    pub role: Scalar,
    #[serde(default)]
    pub count: Scalar,
}

// ---------------------------------------------------------------------------
// appointments-analytics

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentsAnalytics {
    #[serde(default, deserialize_with = "nullable")]
    pub summary: AppointmentSummary,
    #[serde(default, deserialize_with = "rows")]
    pub appointments: Vec<AppointmentRow>,
    #[serde(default, rename = "byDoctor", alias = "by_doctor", deserialize_with = "rows")]
    pub by_doctor: Vec<DoctorLoad>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentSummary {
    #[serde(default, alias = "totalAppointments")]
    pub total_appointments: Scalar,
    #[serde(default)]
    pub completed: Scalar,
    #[serde(default)]
    pub pending: Scalar,
    #[serde(default)]
    pub cancelled: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentRow {
    #[serde(default, alias = "patientName")]
    pub patient_name: Scalar,
    #[serde(default, alias = "doctorName")]
    pub doctor_name: Scalar,
    #[serde(default)]
    pub date: Scalar,
    #[serde(default)]
    pub time: Scalar,
    #[serde(default)]
    pub status: Scalar,
    #[serde(default)]
    pub reason: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorLoad {
    #[serde(default, alias = "doctorName")]
    pub doctor_name: Scalar,
    #[serde(default)]
    pub total: Scalar,
    #[serde(default)]
    pub completed: Scalar,
}

// ---------------------------------------------------------------------------
// doctor-availability

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorAvailability {
    #[serde(default, deserialize_with = "nullable")]
    pub summary: AvailabilitySummary,
    #[serde(default, deserialize_with = "rows")]
    pub doctors: Vec<DoctorScheduleRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilitySummary {
    #[serde(default, alias = "totalDoctors")]
    pub total_doctors: Scalar,
    #[serde(default, alias = "availableDoctors")]
    pub available_doctors: Scalar,
    #[serde(default, alias = "totalSlots")]
    pub total_slots: Scalar,
    #[serde(default, alias = "bookedSlots")]
    pub booked_slots: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorScheduleRow {
    #[serde(default, alias = "fullName")]
    pub name: Scalar,
    #[serde(default)]
    pub specialty: Scalar,
    #[serde(default)]
    pub day: Scalar,
    #[serde(default, alias = "startTime")]
    pub start_time: Scalar,
    #[serde(default, alias = "endTime")]
    pub end_time: Scalar,
    #[serde(default)]
    pub status: Scalar,
}

// ---------------------------------------------------------------------------
// community-engagement

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommunityEngagement {
    #[serde(default, rename = "forumActivity", alias = "forum_activity", deserialize_with = "nullable")]
    pub forum_activity: ForumActivity,
    #[serde(default, rename = "topTopics", alias = "top_topics", deserialize_with = "rows")]
    pub top_topics: Vec<TopicRow>,
    #[serde(default, rename = "successStories", alias = "success_stories", deserialize_with = "rows")]
    pub success_stories: Vec<StoryRow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForumActivity {
    #[serde(default, alias = "totalTopics")]
    pub total_topics: Scalar,
    #[serde(default, alias = "totalPosts")]
    pub total_posts: Scalar,
    #[serde(default, alias = "totalLikes")]
    pub total_likes: Scalar,
    #[serde(default, alias = "activeMembers")]
    pub active_members: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicRow {
    #[serde(default)]
    pub title: Scalar,
    #[serde(default)]
    pub author: Scalar,
    #[serde(default, alias = "postCount", alias = "post_count")]
    pub posts: Scalar,
    #[serde(default, alias = "likeCount", alias = "like_count")]
    pub likes: Scalar,
    #[serde(default, alias = "createdAt")]
    pub created_at: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoryRow {
    #[serde(default)]
    pub title: Scalar,
    #[serde(default)]
    pub author: Scalar,
    #[serde(default, alias = "createdAt")]
    pub created_at: Scalar,
}

/// Report body, one shape per report kind
#[derive(Debug, Clone)]
pub enum ReportPayload {
    UserOverview(UserOverview),
    AppointmentsAnalytics(AppointmentsAnalytics),
    DoctorAvailability(DoctorAvailability),
    CommunityEngagement(CommunityEngagement),
}

impl ReportPayload {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportPayload::UserOverview(_) => ReportKind::UserOverview,
            ReportPayload::AppointmentsAnalytics(_) => ReportKind::AppointmentsAnalytics,
            ReportPayload::DoctorAvailability(_) => ReportKind::DoctorAvailability,
            ReportPayload::CommunityEngagement(_) => ReportKind::CommunityEngagement,
        }
    }

    pub fn empty(kind: ReportKind) -> Self {
        match kind {
            ReportKind::UserOverview => ReportPayload::UserOverview(Default::default()),
            ReportKind::AppointmentsAnalytics => {
                ReportPayload::AppointmentsAnalytics(Default::default())
            }
            ReportKind::DoctorAvailability => ReportPayload::DoctorAvailability(Default::default()),
            ReportKind::CommunityEngagement => {
                ReportPayload::CommunityEngagement(Default::default())
            }
        }
    }

    /// Decode a backend response for `kind`. The body may be the payload itself
    /// or an object wrapping it under the kind's slug or camelCase key.
    pub fn from_value(kind: ReportKind, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let body = match value {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            serde_json::Value::Object(mut map) => {
                let nested = map
                    .remove(kind.slug())
                    .or_else(|| map.remove(kind.payload_key()))
                    .filter(|v| v.is_object());
                match nested {
                    Some(inner) => inner,
                    None => serde_json::Value::Object(map),
                }
            }
            other => other,
        };

        Ok(match kind {
            ReportKind::UserOverview => ReportPayload::UserOverview(serde_json::from_value(body)?),
            ReportKind::AppointmentsAnalytics => {
                ReportPayload::AppointmentsAnalytics(serde_json::from_value(body)?)
            }
            ReportKind::DoctorAvailability => {
                ReportPayload::DoctorAvailability(serde_json::from_value(body)?)
            }
            ReportKind::CommunityEngagement => {
                ReportPayload::CommunityEngagement(serde_json::from_value(body)?)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableBlock {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A rendered block shared by the screen view and the document assembler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportSection {
    Stats { title: String, cards: Vec<StatCard> },
    Table(TableBlock),
}

impl ReportSection {
    pub fn title(&self) -> &str {
        match self {
            ReportSection::Stats { title, .. } => title,
            ReportSection::Table(table) => &table.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPhase {
    Idle,
    Fetching,
    Rendered,
    FetchFailed,
    Exporting,
    Downloaded,
    ExportFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportEvent {
    FetchStarted,
    FetchSucceeded,
    FetchFailed,
    ExportStarted,
    ExportSucceeded,
    ExportFailed,
}

impl ReportPhase {
    /// Next phase for `event`, or None when the event is not valid here
    pub fn apply(self, event: ReportEvent) -> Option<ReportPhase> {
        use ReportEvent as E;
        use ReportPhase as P;

        match (self, event) {
            (P::Exporting, E::FetchStarted) => None,
            (_, E::FetchStarted) => Some(P::Fetching),
            (P::Fetching, E::FetchSucceeded) => Some(P::Rendered),
            (P::Fetching, E::FetchFailed) => Some(P::FetchFailed),
            (P::Rendered | P::Downloaded | P::ExportFailed, E::ExportStarted) => Some(P::Exporting),
            (P::Exporting, E::ExportSucceeded) => Some(P::Downloaded),
            (P::Exporting, E::ExportFailed) => Some(P::ExportFailed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_slugs_round_trip() {
        for kind in ReportKind::ALL {
            assert_eq!(kind.slug().parse::<ReportKind>(), Ok(kind));
        }
        assert_eq!(
            "billing".parse::<ReportKind>(),
            Err(UnknownReportKind("billing".to_string()))
        );
    }

    #[test]
    fn test_query_pairs_include_both_dates() {
        let query = ReportQuery::new(ReportKind::AppointmentsAnalytics).with_range(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31),
        );

        assert_eq!(
            query.query_pairs(),
            vec![
                ("startDate", "2024-01-01".to_string()),
                ("endDate", "2024-01-31".to_string()),
            ]
        );
        assert_eq!(
            query.describe_range().as_deref(),
            Some("Period: 2024-01-01 to 2024-01-31")
        );
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let query = ReportQuery::new(ReportKind::UserOverview).with_search(Some("   ".to_string()));
        assert!(query.search.is_none());
        assert!(query.query_pairs().is_empty());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let query = ReportQuery::new(ReportKind::UserOverview).with_range(Some(start), Some(end));

        assert_eq!(query.validate(), Err(InvalidDateRange { start, end }));
    }

    #[test]
    fn test_scalar_formatting() {
        assert_eq!(Scalar::Number(12.0).to_string(), "12");
        assert_eq!(Scalar::Number(2.5).to_string(), "2.50");
        assert_eq!(Scalar::Missing.to_string(), "");
        assert_eq!(Scalar::Flag(true).to_string(), "Yes");
    }

    #[test]
    fn test_payload_tolerates_nulls_and_missing_sections() {
        let value = json!({
            "forumActivity": { "total_topics": 12, "total_posts": null },
            "topTopics": null,
            "successStories": [null, { "title": "Recovered", "author": null }]
        });

        let payload = ReportPayload::from_value(ReportKind::CommunityEngagement, value).unwrap();
        let ReportPayload::CommunityEngagement(body) = payload else {
            panic!("wrong payload variant");
        };

        assert_eq!(body.forum_activity.total_topics, Scalar::Number(12.0));
        assert!(body.forum_activity.total_posts.is_missing());
        assert!(body.top_topics.is_empty());
        assert_eq!(body.success_stories.len(), 1);
        assert!(body.success_stories[0].author.is_missing());
    }

    #[test]
    fn test_payload_nested_under_kind_key() {
        let value = json!({ "user-overview": { "summary": { "totalUsers": "40" } } });

        let payload = ReportPayload::from_value(ReportKind::UserOverview, value).unwrap();
        let ReportPayload::UserOverview(body) = payload else {
            panic!("wrong payload variant");
        };

        assert_eq!(body.summary.total_users, Scalar::Text("40".to_string()));
    }

    #[test]
    fn test_phase_transitions() {
        let phase = ReportPhase::Idle
            .apply(ReportEvent::FetchStarted)
            .and_then(|p| p.apply(ReportEvent::FetchSucceeded))
            .and_then(|p| p.apply(ReportEvent::ExportStarted))
            .and_then(|p| p.apply(ReportEvent::ExportSucceeded));
        assert_eq!(phase, Some(ReportPhase::Downloaded));

        assert_eq!(ReportPhase::Idle.apply(ReportEvent::ExportStarted), None);
        assert_eq!(ReportPhase::FetchFailed.apply(ReportEvent::ExportStarted), None);
        assert_eq!(
            ReportPhase::FetchFailed.apply(ReportEvent::FetchStarted),
            Some(ReportPhase::Fetching)
        );
    }
}
