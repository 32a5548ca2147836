// Dashboard service - Use case for building the analytics dashboard
use crate::application::errors::ApiError;
use crate::application::repositories::DashboardRepository;
use crate::domain::analytics::{ChartData, ChartKind, SeriesData, TileData, TimeSeriesPoint};
use crate::domain::dashboard::Dashboard;
use crate::infrastructure::config::{ChartConfig, DashboardConfig};
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn DashboardRepository>,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn DashboardRepository>, config: DashboardConfig) -> Self {
        Self { repository, config }
    }

    pub async fn get_dashboard(&self) -> Result<Dashboard, ApiError> {
        let body = self.repository.fetch_dashboard().await?;

        let tiles = self.build_tiles(&body);
        let charts = self.build_charts(&body);

        Ok(Dashboard::new(self.config.title.clone(), tiles, charts))
    }

    fn build_tiles(&self, body: &Value) -> Vec<TileData> {
        let stats = body.get("stats").unwrap_or(body);
        let mut tiles = Vec::new();

        for tile_config in &self.config.tiles {
            match stats.get(&tile_config.stat).and_then(numeric) {
                Some(value) => tiles.push(TileData::new(
                    tile_config.id.clone(),
                    tile_config.title.clone(),
                    tile_config.unit.clone(),
                    value,
                    tile_config.precision,
                )),
                None => {
                    // No data, skip this tile
                    tracing::debug!(tile = %tile_config.id, stat = %tile_config.stat, "dashboard stat missing");
                }
            }
        }

        tiles
    }

    fn build_charts(&self, body: &Value) -> Vec<ChartData> {
        let mut charts = Vec::new();

        for chart_config in &self.config.charts {
            let series_list = self.build_series(chart_config, body);

            // Only add chart if it has at least one series with data
            if !series_list.is_empty() {
                let kind = match chart_config.kind.as_str() {
                    "bar" => ChartKind::Bar,
                    _ => ChartKind::Line,
                };

                charts.push(ChartData::new(
                    chart_config.id.clone(),
                    chart_config.title.clone(),
                    chart_config.unit.clone(),
                    kind,
                    series_list,
                ));
            }
        }

        charts
    }

    fn build_series(&self, chart_config: &ChartConfig, body: &Value) -> Vec<SeriesData> {
        let mut series_list = Vec::new();

        for series_config in &chart_config.series {
            let Some(entries) = body.get(&series_config.source).and_then(Value::as_array) else {
                tracing::debug!(series = %series_config.id, source = %series_config.source, "dashboard series missing");
                continue;
            };

            let points: Vec<TimeSeriesPoint> = entries
                .iter()
                .filter_map(|entry| {
                    let time_ms = entry.get(&series_config.time_field).and_then(timestamp_ms)?;
                    let value = entry.get(&series_config.value_field).and_then(numeric)?;
                    Some(TimeSeriesPoint::new(time_ms, value))
                })
                .collect();

            if !points.is_empty() {
                series_list.push(SeriesData::new(
                    series_config.id.clone(),
                    series_config.name.clone(),
                    series_config.color.clone(),
                    points,
                ));
            }
        }

        series_list
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts RFC 3339 timestamps, calendar dates and `YYYY-MM` months
fn timestamp_ms(value: &Value) -> Option<i64> {
    let text = value.as_str()?;
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.timestamp_millis());
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d"))
        .ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::{SeriesConfig, TileConfig};
    use async_trait::async_trait;
    use serde_json::json;

    struct FakeDashboard(Value);

    #[async_trait]
    impl DashboardRepository for FakeDashboard {
        async fn fetch_dashboard(&self) -> Result<Value, ApiError> {
            Ok(self.0.clone())
        }
    }

    fn config() -> DashboardConfig {
        DashboardConfig {
            title: "Healthcare Analytics".to_string(),
            tiles: vec![
                TileConfig {
                    id: "patients".to_string(),
                    title: "Patients".to_string(),
                    unit: "".to_string(),
                    precision: 0,
                    stat: "totalPatients".to_string(),
                },
                TileConfig {
                    id: "doctors".to_string(),
                    title: "Doctors".to_string(),
                    unit: "".to_string(),
                    precision: 0,
                    stat: "totalDoctors".to_string(),
                },
            ],
            charts: vec![ChartConfig {
                id: "appointments".to_string(),
                title: "Appointments".to_string(),
                unit: None,
                kind: "line".to_string(),
                series: vec![
                    SeriesConfig {
                        id: "booked".to_string(),
                        name: "Booked".to_string(),
                        color: Some("#0d6efd".to_string()),
                        source: "appointmentTrends".to_string(),
                        time_field: "date".to_string(),
                        value_field: "count".to_string(),
                    },
                    SeriesConfig {
                        id: "growth".to_string(),
                        name: "New users".to_string(),
                        color: None,
                        source: "userGrowth".to_string(),
                        time_field: "date".to_string(),
                        value_field: "count".to_string(),
                    },
                ],
            }],
        }
    }

    #[tokio::test]
    async fn test_dashboard_from_backend_body() {
        let body = json!({
            "stats": { "totalPatients": 120, "totalDoctors": null },
            "appointmentTrends": [
                { "date": "2024-01-01", "count": 4 },
                { "date": "2024-01", "count": "7" },
                { "date": "not a date", "count": 1 }
            ]
        });
        let service = DashboardService::new(Arc::new(FakeDashboard(body)), config());

        let dashboard = service.get_dashboard().await.unwrap();

        assert_eq!(dashboard.tiles.len(), 1);
        assert_eq!(dashboard.tiles[0].value, 120.0);
        assert_eq!(dashboard.charts.len(), 1);
        // userGrowth is absent, so only one series survives
        assert_eq!(dashboard.charts[0].series.len(), 1);
        assert_eq!(dashboard.charts[0].series[0].points.len(), 2);
        assert_eq!(dashboard.charts[0].series[0].points[1].value, 7.0);
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(timestamp_ms(&json!("1970-01-02")), Some(86_400_000));
        assert_eq!(timestamp_ms(&json!("1970-01-01T00:00:01Z")), Some(1000));
        assert_eq!(timestamp_ms(&json!(5)), None);
    }
}
