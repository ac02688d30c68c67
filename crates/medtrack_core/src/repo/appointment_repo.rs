//! Appointment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/get/list/delete over the `appointments` table.
//! - Keep SQL and column mapping inside the persistence boundary.
//!
//! # Invariants
//! - `update_appointment` replaces all four editable fields and keeps `uuid`.
//! - Listing ties are ordered by insertion sequence (`seq ASC`).
//! - Form-level validation is not applied here.

use crate::model::appointment::{Appointment, AppointmentId};
use crate::repo::{ensure_table_ready, parse_uuid, RepoError, RepoResult, SortOrder};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};

const APPOINTMENT_SELECT_SQL: &str = "SELECT
    uuid,
    practice_name,
    appointment_date,
    reason,
    doctor_name
FROM appointments";

const REQUIRED_COLUMNS: &[&str] = &[
    "seq",
    "uuid",
    "practice_name",
    "appointment_date",
    "reason",
    "doctor_name",
    "updated_at",
];

/// Sort key for appointment listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppointmentSortKey {
    #[default]
    AppointmentDate,
    PracticeName,
    DoctorName,
}

impl AppointmentSortKey {
    fn column(self) -> &'static str {
        match self {
            Self::AppointmentDate => "appointment_date",
            Self::PracticeName => "practice_name",
            Self::DoctorName => "doctor_name",
        }
    }
}

/// Listing options. The default is reverse chronological by date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppointmentListQuery {
    pub sort: AppointmentSortKey,
    pub order: SortOrder,
}

impl AppointmentListQuery {
    /// Most recent (or furthest future) appointment first.
    pub fn newest_first() -> Self {
        Self::default()
    }
}

/// Record-store operations for appointments.
pub trait AppointmentRepository {
    fn insert_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId>;
    /// Fails with `NotFound` when no row has `appointment.id`.
    fn update_appointment(&self, appointment: &Appointment) -> RepoResult<()>;
    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>>;
    fn list_appointments(&self, query: &AppointmentListQuery) -> RepoResult<Vec<Appointment>>;
    /// Returns `false` when the appointment was already absent.
    fn delete_appointment(&self, id: AppointmentId) -> RepoResult<bool>;
}

/// SQLite-backed appointment repository.
pub struct SqliteAppointmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAppointmentRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for a foreign schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "appointments", REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl AppointmentRepository for SqliteAppointmentRepository<'_> {
    fn insert_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId> {
        self.conn.execute(
            "INSERT INTO appointments (
                uuid,
                practice_name,
                appointment_date,
                reason,
                doctor_name
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                appointment.id.to_string(),
                appointment.practice_name.as_str(),
                appointment.appointment_date,
                appointment.reason.as_str(),
                appointment.doctor_name.as_str(),
            ],
        )?;
        debug!(
            "event=appointment_insert module=repo status=ok appointment_id={}",
            appointment.id
        );

        Ok(appointment.id)
    }

    fn update_appointment(&self, appointment: &Appointment) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE appointments
             SET
                practice_name = ?1,
                appointment_date = ?2,
                reason = ?3,
                doctor_name = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                appointment.practice_name.as_str(),
                appointment.appointment_date,
                appointment.reason.as_str(),
                appointment.doctor_name.as_str(),
                appointment.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(appointment.id));
        }

        Ok(())
    }

    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{APPOINTMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], |row| Ok(read_row(row)))
            .optional()?;

        row.transpose()
    }

    fn list_appointments(&self, query: &AppointmentListQuery) -> RepoResult<Vec<Appointment>> {
        // Both fragments come from closed enums, never from caller text.
        let sql = format!(
            "{APPOINTMENT_SELECT_SQL} ORDER BY {} {}, seq ASC;",
            query.sort.column(),
            query.order.as_sql()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut appointments = Vec::new();
        while let Some(row) = rows.next()? {
            appointments.push(read_row(row)?);
        }

        Ok(appointments)
    }

    fn delete_appointment(&self, id: AppointmentId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM appointments WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn read_row(row: &Row<'_>) -> RepoResult<Appointment> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Appointment {
        id: parse_uuid(&uuid_text, "appointments.uuid")?,
        practice_name: row.get("practice_name")?,
        appointment_date: row.get("appointment_date")?,
        reason: row.get("reason")?,
        doctor_name: row.get("doctor_name")?,
    })
}
