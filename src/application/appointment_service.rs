// Appointment service - doctor availability and appointment status changes
use crate::application::errors::{require_text, ServiceError};
use crate::application::repositories::AppointmentRepository;
use crate::application::session_context::SessionContext;
use crate::domain::appointment::{AppointmentStatus, AvailabilitySlot, DoctorAvailability};
use crate::domain::id::EntityId;
use crate::domain::session::Role;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppointmentService {
    repository: Arc<dyn AppointmentRepository>,
    session: Arc<SessionContext>,
}

impl AppointmentService {
    pub fn new(repository: Arc<dyn AppointmentRepository>, session: Arc<SessionContext>) -> Self {
        Self {
            repository,
            session,
        }
    }

    /// Availability of the logged-in doctor
    pub async fn my_availability(&self) -> Result<DoctorAvailability, ServiceError> {
        let session = self.session.require_role(Role::Doctor)?;
        Ok(self.repository.availability(&session.user.id).await?)
    }

    /// Replaces the logged-in doctor's weekly slots after validating each one
    pub async fn set_availability(
        &self,
        slots: Vec<AvailabilitySlot>,
    ) -> Result<DoctorAvailability, ServiceError> {
        let session = self.session.require_role(Role::Doctor)?;
        for slot in &slots {
            require_text("day", &slot.day)?;
            slot.validate()
                .map_err(|e| ServiceError::Invalid(e.to_string()))?;
        }

        let saved = self
            .repository
            .update_availability(&session.user.id, &slots)
            .await?;
        tracing::info!(doctor = %session.user.id, slots = saved.slots.len(), "availability updated");
        Ok(saved)
    }

    pub async fn update_status(
        &self,
        appointment_id: &EntityId,
        status: AppointmentStatus,
    ) -> Result<(), ServiceError> {
        self.session.require()?;
        require_text("appointment id", appointment_id.as_str())?;

        self.repository.update_status(appointment_id, status).await?;
        tracing::info!(appointment = %appointment_id, status = ?status, "appointment status changed");
        Ok(())
    }
}
