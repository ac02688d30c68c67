//! Medical appointment model.
//!
//! # Responsibility
//! - Define the appointment record and its four editable fields.
//! - Offer boundary validation for form input.
//!
//! # Invariants
//! - `id` is stable across edits and never reused.
//! - `appointment_date` is Unix epoch milliseconds with no timezone
//!   normalization.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an appointment.
pub type AppointmentId = Uuid;

/// Names the user-editable appointment fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentField {
    PracticeName,
    Reason,
    DoctorName,
}

impl AppointmentField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PracticeName => "practice_name",
            Self::Reason => "reason",
            Self::DoctorName => "doctor_name",
        }
    }
}

/// Validation failures for appointment input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentValidationError {
    NilId,
    EmptyField(AppointmentField),
}

impl Display for AppointmentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "appointment id must not be nil"),
            Self::EmptyField(field) => write!(f, "{} must not be empty", field.as_str()),
        }
    }
}

impl Error for AppointmentValidationError {}

/// The four fields captured by the add and edit forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentFields {
    pub practice_name: String,
    /// Unix epoch milliseconds.
    pub appointment_date: i64,
    /// Free text; may span multiple lines.
    pub reason: String,
    pub doctor_name: String,
}

impl AppointmentFields {
    pub fn new(
        practice_name: impl Into<String>,
        appointment_date: i64,
        reason: impl Into<String>,
        doctor_name: impl Into<String>,
    ) -> Self {
        Self {
            practice_name: practice_name.into(),
            appointment_date,
            reason: reason.into(),
            doctor_name: doctor_name.into(),
        }
    }

    /// Rejects blank text fields.
    ///
    /// Only the form boundary calls this; the store accepts any strings.
    pub fn validate(&self) -> Result<(), AppointmentValidationError> {
        let checks = [
            (AppointmentField::PracticeName, &self.practice_name),
            (AppointmentField::Reason, &self.reason),
            (AppointmentField::DoctorName, &self.doctor_name),
        ];
        for (field, value) in checks {
            if value.trim().is_empty() {
                return Err(AppointmentValidationError::EmptyField(field));
            }
        }
        Ok(())
    }
}

/// A persisted medical appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub practice_name: String,
    /// Unix epoch milliseconds.
    pub appointment_date: i64,
    pub reason: String,
    pub doctor_name: String,
}

impl Appointment {
    /// Creates an appointment with a freshly generated id.
    pub fn new(fields: AppointmentFields) -> Self {
        Self::from_parts(Uuid::new_v4(), fields)
    }

    /// Creates an appointment with a caller-provided id.
    ///
    /// # Errors
    /// - `NilId` when `id` is the nil UUID.
    pub fn with_id(
        id: AppointmentId,
        fields: AppointmentFields,
    ) -> Result<Self, AppointmentValidationError> {
        if id.is_nil() {
            return Err(AppointmentValidationError::NilId);
        }
        Ok(Self::from_parts(id, fields))
    }

    /// Replaces all four editable fields; identity is kept.
    pub fn apply(&mut self, fields: AppointmentFields) {
        self.practice_name = fields.practice_name;
        self.appointment_date = fields.appointment_date;
        self.reason = fields.reason;
        self.doctor_name = fields.doctor_name;
    }

    /// Returns a copy of the editable fields, e.g. to pre-populate a form.
    pub fn fields(&self) -> AppointmentFields {
        AppointmentFields {
            practice_name: self.practice_name.clone(),
            appointment_date: self.appointment_date,
            reason: self.reason.clone(),
            doctor_name: self.doctor_name.clone(),
        }
    }

    fn from_parts(id: AppointmentId, fields: AppointmentFields) -> Self {
        Self {
            id,
            practice_name: fields.practice_name,
            appointment_date: fields.appointment_date,
            reason: fields.reason,
            doctor_name: fields.doctor_name,
        }
    }
}
