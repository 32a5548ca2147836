// Section renderers - map a report payload onto stat and table blocks
//
// The same sections drive the JSON screen view and the PDF assembler, so every
// string leaving this module is already coerced and stripped of markup.
use crate::domain::report::{
    AppointmentsAnalytics, CommunityEngagement, DoctorAvailability, ReportPayload, ReportSection,
    Scalar, StatCard, TableBlock, UserOverview,
};
use regex::Regex;
use std::sync::LazyLock;

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

/// Sections in the fixed order for the payload's report kind
pub fn render_sections(payload: &ReportPayload) -> Vec<ReportSection> {
    match payload {
        ReportPayload::UserOverview(body) => user_overview(body),
        ReportPayload::AppointmentsAnalytics(body) => appointments_analytics(body),
        ReportPayload::DoctorAvailability(body) => doctor_availability(body),
        ReportPayload::CommunityEngagement(body) => community_engagement(body),
    }
}

/// Best-effort removal of tag-like text. Not a security boundary.
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").trim().to_string()
}

fn cell(value: &Scalar) -> String {
    strip_markup(&value.to_string())
}

/// Timestamps are shown as their calendar date
fn date_cell(value: &Scalar) -> String {
    let text = cell(value);
    match chrono::DateTime::parse_from_rfc3339(&text) {
        Ok(timestamp) => timestamp.date_naive().to_string(),
        Err(_) => text,
    }
}

fn card(label: &str, value: &Scalar) -> StatCard {
    let value = if value.is_missing() {
        "0".to_string()
    } else {
        cell(value)
    };
    StatCard {
        label: label.to_string(),
        value,
    }
}

fn stats(title: &str, cards: Vec<StatCard>) -> ReportSection {
    ReportSection::Stats {
        title: title.to_string(),
        cards,
    }
}

fn table(title: &str, headers: &[&str], rows: Vec<Vec<String>>, description: Option<&str>) -> ReportSection {
    ReportSection::Table(TableBlock {
        title: title.to_string(),
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows,
        description: description.map(str::to_string),
    })
}

fn completion_rate(total: &Scalar, completed: &Scalar) -> String {
    match (total, completed) {
        (Scalar::Number(total), Scalar::Number(done)) if *total > 0.0 => {
            format!("{:.0}%", done / total * 100.0)
        }
        _ => String::new(),
    }
}

fn user_overview(body: &UserOverview) -> Vec<ReportSection> {
    let summary = &body.summary;
    vec![
        stats(
            "User Statistics",
            vec![
                card("Total Users", &summary.total_users),
                card("Active Users", &summary.active_users),
                card("New Users", &summary.new_users),
                card("Doctors", &summary.total_doctors),
                card("Patients", &summary.total_patients),
            ],
        ),
        table(
            "Role Distribution",
            &["Role", "Count"],
            body.role_distribution
                .iter()
                .map(|r| vec![cell(&r.role), cell(&r.count)])
                .collect(),
            Some("Registered accounts per role"),
        ),
        table(
            "Registered Users",
            &["Name", "Email", "Role", "Status", "Joined"],
            body.users
                .iter()
                .map(|u| {
                    vec![
                        cell(&u.name),
                        cell(&u.email),
                        cell(&u.role),
                        cell(&u.status),
                        date_cell(&u.created_at),
                    ]
                })
                .collect(),
            None,
        ),
    ]
}

fn appointments_analytics(body: &AppointmentsAnalytics) -> Vec<ReportSection> {
    let summary = &body.summary;
    vec![
        stats(
            "Appointment Statistics",
            vec![
                card("Total Appointments", &summary.total_appointments),
                card("Completed", &summary.completed),
                card("Pending", &summary.pending),
                card("Cancelled", &summary.cancelled),
            ],
        ),
        table(
            "Appointments by Doctor",
            &["Doctor", "Total", "Completed", "Completion Rate"],
            body.by_doctor
                .iter()
                .map(|d| {
                    vec![
                        cell(&d.doctor_name),
                        cell(&d.total),
                        cell(&d.completed),
                        completion_rate(&d.total, &d.completed),
                    ]
                })
                .collect(),
            Some("Workload and completion per doctor"),
        ),
        table(
            "Appointment Details",
            &["Patient", "Doctor", "Date", "Time", "Status", "Reason"],
            body.appointments
                .iter()
                .map(|a| {
                    vec![
                        cell(&a.patient_name),
                        cell(&a.doctor_name),
                        date_cell(&a.date),
                        cell(&a.time),
                        cell(&a.status),
                        cell(&a.reason),
                    ]
                })
                .collect(),
            None,
        ),
    ]
}

fn doctor_availability(body: &DoctorAvailability) -> Vec<ReportSection> {
    let summary = &body.summary;
    vec![
        stats(
            "Availability Statistics",
            vec![
                card("Total Doctors", &summary.total_doctors),
                card("Available Doctors", &summary.available_doctors),
                card("Total Slots", &summary.total_slots),
                card("Booked Slots", &summary.booked_slots),
            ],
        ),
        table(
            "Doctor Schedules",
            &["Doctor", "Specialty", "Day", "Start", "End", "Status"],
            body.doctors
                .iter()
                .map(|d| {
                    vec![
                        cell(&d.name),
                        cell(&d.specialty),
                        cell(&d.day),
                        cell(&d.start_time),
                        cell(&d.end_time),
                        cell(&d.status),
                    ]
                })
                .collect(),
            Some("Weekly consultation slots"),
        ),
    ]
}

fn community_engagement(body: &CommunityEngagement) -> Vec<ReportSection> {
    let activity = &body.forum_activity;
    vec![
        stats(
            "Forum Activity",
            vec![
                card("Total Topics", &activity.total_topics),
                card("Total Posts", &activity.total_posts),
                card("Total Likes", &activity.total_likes),
                card("Active Members", &activity.active_members),
            ],
        ),
        table(
            "Top Topics",
            &["Title", "Author", "Posts", "Likes", "Created"],
            body.top_topics
                .iter()
                .map(|t| {
                    vec![
                        cell(&t.title),
                        cell(&t.author),
                        cell(&t.posts),
                        cell(&t.likes),
                        date_cell(&t.created_at),
                    ]
                })
                .collect(),
            Some("Most active forum discussions"),
        ),
        table(
            "Success Stories",
            &["Title", "Author", "Published"],
            body.success_stories
                .iter()
                .map(|s| vec![cell(&s.title), cell(&s.author), date_cell(&s.created_at)])
                .collect(),
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::ReportKind;
    use serde_json::json;

    fn render(kind: ReportKind, value: serde_json::Value) -> Vec<ReportSection> {
        render_sections(&ReportPayload::from_value(kind, value).unwrap())
    }

    #[test]
    fn test_total_topics_card() {
        let sections = render(
            ReportKind::CommunityEngagement,
            json!({ "forumActivity": { "total_topics": 12 } }),
        );

        let ReportSection::Stats { title, cards } = &sections[0] else {
            panic!("first section should be statistics");
        };
        assert_eq!(title, "Forum Activity");
        assert_eq!(
            cards[0],
            StatCard {
                label: "Total Topics".to_string(),
                value: "12".to_string()
            }
        );
        assert_eq!(cards[1].value, "0");
    }

    #[test]
    fn test_null_cells_render_empty() {
        let sections = render(
            ReportKind::UserOverview,
            json!({ "users": [{ "name": "Jean", "email": null }] }),
        );

        let ReportSection::Table(users) = &sections[2] else {
            panic!("third section should be the users table");
        };
        assert_eq!(users.rows, vec![vec!["Jean", "", "", "", ""]]);
        for value in users.rows.iter().flatten() {
            assert_ne!(value, "null");
            assert_ne!(value, "undefined");
        }
    }

    #[test]
    fn test_markup_is_stripped() {
        assert_eq!(strip_markup("<b>Malaria</b> prevention<script>x</script>"), "Malaria preventionx");
        assert_eq!(strip_markup("3 < 4"), "3 < 4");
    }

    #[test]
    fn test_section_order_per_kind() {
        let titles = |kind| {
            render_sections(&ReportPayload::empty(kind))
                .iter()
                .map(|s| s.title().to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(
            titles(ReportKind::AppointmentsAnalytics),
            vec!["Appointment Statistics", "Appointments by Doctor", "Appointment Details"]
        );
        assert_eq!(
            titles(ReportKind::DoctorAvailability),
            vec!["Availability Statistics", "Doctor Schedules"]
        );
    }

    #[test]
    fn test_completion_rate_and_dates() {
        let sections = render(
            ReportKind::AppointmentsAnalytics,
            json!({
                "byDoctor": [{ "doctor_name": "Dr. Habimana", "total": 8, "completed": 6 }],
                "appointments": [{ "date": "2024-01-05T09:30:00Z", "status": "completed" }]
            }),
        );

        let ReportSection::Table(by_doctor) = &sections[1] else {
            panic!("expected table");
        };
        assert_eq!(by_doctor.rows[0][3], "75%");

        let ReportSection::Table(details) = &sections[2] else {
            panic!("expected table");
        };
        assert_eq!(details.rows[0][2], "2024-01-05");
    }
}
