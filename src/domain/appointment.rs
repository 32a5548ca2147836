// Appointment domain model - doctor availability and appointment status
use super::id::EntityId;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorAvailability {
    #[serde(default, alias = "doctorId")]
    pub doctor_id: Option<EntityId>,
    #[serde(default)]
    pub slots: Vec<AvailabilitySlot>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SlotError {
    #[error("invalid time '{0}', expected HH:MM")]
    BadTime(String),
    #[error("slot on {day} ends at {end} before it starts at {start}")]
    Inverted { day: String, start: String, end: String },
}

impl AvailabilitySlot {
    pub fn validate(&self) -> Result<(), SlotError> {
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;
        if start >= end {
            return Err(SlotError::Inverted {
                day: self.day.clone(),
                start: self.start_time.clone(),
                end: self.end_time.clone(),
            });
        }
        Ok(())
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, SlotError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| SlotError::BadTime(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: &str, end: &str) -> AvailabilitySlot {
        AvailabilitySlot {
            day: "Monday".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            available: true,
        }
    }

    #[test]
    fn test_slot_validation() {
        assert!(slot("08:00", "12:30").validate().is_ok());
        assert!(matches!(slot("14:00", "09:00").validate(), Err(SlotError::Inverted { .. })));
        assert_eq!(
            slot("8am", "12:00").validate(),
            Err(SlotError::BadTime("8am".to_string()))
        );
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert!(serde_json::from_str::<AppointmentStatus>("\"rescheduled\"").is_err());
    }
}
