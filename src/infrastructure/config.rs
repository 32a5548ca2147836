use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportSettings {
    #[serde(default = "default_organization")]
    pub organization: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default = "default_logo_timeout_ms")]
    pub logo_timeout_ms: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_organization() -> String {
    "MedConnect Rwanda".to_string()
}

fn default_logo_timeout_ms() -> u64 {
    5000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            logo_url: None,
            logo_timeout_ms: default_logo_timeout_ms(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl NotificationSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl ReportSettings {
    pub fn logo_timeout(&self) -> Duration {
        Duration::from_millis(self.logo_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_title")]
    pub title: String,
    #[serde(default)]
    pub tiles: Vec<TileConfig>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub precision: i32,
    /// Key inside the dashboard body's `stats` object
    pub stat: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    #[serde(default = "default_chart_kind")]
    pub kind: String,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    /// Top-level array in the dashboard body, e.g. `appointmentTrends`
    pub source: String,
    #[serde(default = "default_time_field")]
    pub time_field: String,
    #[serde(default = "default_value_field")]
    pub value_field: String,
}

fn default_dashboard_title() -> String {
    "Healthcare Analytics".to_string()
}

fn default_chart_kind() -> String {
    "line".to_string()
}

fn default_time_field() -> String {
    "date".to_string()
}

fn default_value_field() -> String {
    "count".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let series = |id: &str, name: &str, color: &str, source: &str| SeriesConfig {
            id: id.to_string(),
            name: name.to_string(),
            color: Some(color.to_string()),
            source: source.to_string(),
            time_field: default_time_field(),
            value_field: default_value_field(),
        };
        let tile = |id: &str, title: &str, stat: &str| TileConfig {
            id: id.to_string(),
            title: title.to_string(),
            unit: String::new(),
            precision: 0,
            stat: stat.to_string(),
        };

        Self {
            title: default_dashboard_title(),
            tiles: vec![
                tile("users", "Total Users", "totalUsers"),
                tile("doctors", "Doctors", "totalDoctors"),
                tile("patients", "Patients", "totalPatients"),
                tile("appointments", "Appointments", "totalAppointments"),
            ],
            charts: vec![
                ChartConfig {
                    id: "appointment-trends".to_string(),
                    title: "Appointment Trends".to_string(),
                    unit: None,
                    kind: default_chart_kind(),
                    series: vec![series("appointments", "Appointments", "#0d6efd", "appointmentTrends")],
                },
                ChartConfig {
                    id: "user-growth".to_string(),
                    title: "User Growth".to_string(),
                    unit: None,
                    kind: default_chart_kind(),
                    series: vec![series("users", "New Users", "#198754", "userGrowth")],
                },
            ],
        }
    }
}

/// `config/medconnect.*` overlaid with `MEDCONNECT__SECTION__KEY` variables
pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/medconnect").required(false))
        .add_source(config::Environment::with_prefix("MEDCONNECT").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Dashboard layout; the built-in tiles and charts apply when no file exists
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .build()?;

    let dashboard: DashboardConfig = settings.try_deserialize()?;
    if dashboard.tiles.is_empty() && dashboard.charts.is_empty() {
        return Ok(DashboardConfig::default());
    }

    Ok(dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn parse<T: serde::de::DeserializeOwned>(toml: &str) -> T {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_settings_defaults() {
        let settings: Settings = parse(
            r#"
            [api]
            base_url = "https://api.medconnect.rw/api"
            "#,
        );

        assert_eq!(settings.api.timeout(), Duration::from_secs(15));
        assert_eq!(settings.server.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(settings.notifications.poll_interval(), Duration::from_secs(30));
        assert_eq!(settings.report.organization, "MedConnect Rwanda");
        assert_eq!(settings.report.logo_timeout(), Duration::from_millis(5000));
        assert!(settings.report.logo_url.is_none());
    }

    #[test]
    fn test_dashboard_series_defaults() {
        let dashboard: DashboardConfig = parse(
            r#"
            [[charts]]
            id = "trends"
            title = "Trends"

            [[charts.series]]
            id = "booked"
            name = "Booked"
            source = "appointmentTrends"
            "#,
        );

        assert_eq!(dashboard.title, "Healthcare Analytics");
        assert_eq!(dashboard.charts[0].kind, "line");
        assert_eq!(dashboard.charts[0].series[0].time_field, "date");
        assert_eq!(dashboard.charts[0].series[0].value_field, "count");
    }

    #[test]
    fn test_builtin_dashboard_reads_backend_keys() {
        let dashboard = DashboardConfig::default();
        let sources: Vec<&str> = dashboard
            .charts
            .iter()
            .flat_map(|c| c.series.iter().map(|s| s.source.as_str()))
            .collect();
        assert_eq!(sources, vec!["appointmentTrends", "userGrowth"]);
    }
}
