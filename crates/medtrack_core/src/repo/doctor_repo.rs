//! Doctor registry repository and SQLite implementation.
//!
//! # Invariants
//! - `match_key` is derived from the labels on every insert.
//! - `find_doctor` returns the earliest inserted doctor for a match key.

use crate::model::doctor::{doctor_match_key, Doctor, DoctorId};
use crate::repo::{ensure_table_ready, parse_uuid, RepoResult, SortOrder};
use rusqlite::{params, Connection, OptionalExtension, Row};

const DOCTOR_SELECT_SQL: &str = "SELECT uuid, name, practice_name FROM doctors";

const REQUIRED_COLUMNS: &[&str] = &["seq", "uuid", "name", "practice_name", "match_key"];

/// Sort key for doctor listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DoctorSortKey {
    #[default]
    Name,
    PracticeName,
}

/// Listing options. The default is alphabetical by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoctorListQuery {
    pub sort: DoctorSortKey,
    pub order: SortOrder,
}

impl Default for DoctorListQuery {
    fn default() -> Self {
        Self {
            sort: DoctorSortKey::Name,
            order: SortOrder::Ascending,
        }
    }
}

/// Record-store operations for doctors.
pub trait DoctorRepository {
    fn insert_doctor(&self, doctor: &Doctor) -> RepoResult<DoctorId>;
    fn get_doctor(&self, id: DoctorId) -> RepoResult<Option<Doctor>>;
    /// Looks a doctor up by labels, ignoring case and spacing differences.
    fn find_doctor(&self, name: &str, practice_name: &str) -> RepoResult<Option<Doctor>>;
    fn list_doctors(&self, query: &DoctorListQuery) -> RepoResult<Vec<Doctor>>;
    /// Returns `false` when the doctor was already absent.
    fn delete_doctor(&self, id: DoctorId) -> RepoResult<bool>;
}

/// SQLite-backed doctor repository.
pub struct SqliteDoctorRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDoctorRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "doctors", REQUIRED_COLUMNS)?;
        Ok(Self { conn })
    }

    fn query_one(&self, filter: &str, value: String) -> RepoResult<Option<Doctor>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOCTOR_SELECT_SQL} {filter} ORDER BY seq ASC LIMIT 1;"))?;
        let row = stmt.query_row([value], |row| Ok(read_row(row))).optional()?;
        row.transpose()
    }
}

impl DoctorRepository for SqliteDoctorRepository<'_> {
    fn insert_doctor(&self, doctor: &Doctor) -> RepoResult<DoctorId> {
        self.conn.execute(
            "INSERT INTO doctors (uuid, name, practice_name, match_key)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                doctor.id.to_string(),
                doctor.name.as_str(),
                doctor.practice_name.as_str(),
                doctor.match_key(),
            ],
        )?;
        Ok(doctor.id)
    }

    fn get_doctor(&self, id: DoctorId) -> RepoResult<Option<Doctor>> {
        self.query_one("WHERE uuid = ?1", id.to_string())
    }

    fn find_doctor(&self, name: &str, practice_name: &str) -> RepoResult<Option<Doctor>> {
        self.query_one("WHERE match_key = ?1", doctor_match_key(name, practice_name))
    }

    fn list_doctors(&self, query: &DoctorListQuery) -> RepoResult<Vec<Doctor>> {
        let column = match query.sort {
            DoctorSortKey::Name => "name",
            DoctorSortKey::PracticeName => "practice_name",
        };
        let mut stmt = self.conn.prepare(&format!(
            "{DOCTOR_SELECT_SQL} ORDER BY {column} {}, seq ASC;",
            query.order.as_sql()
        ))?;
        let mut rows = stmt.query([])?;
        let mut doctors = Vec::new();
        while let Some(row) = rows.next()? {
            doctors.push(read_row(row)?);
        }
        Ok(doctors)
    }

    fn delete_doctor(&self, id: DoctorId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM doctors WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

fn read_row(row: &Row<'_>) -> RepoResult<Doctor> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Doctor {
        id: parse_uuid(&uuid_text, "doctors.uuid")?,
        name: row.get("name")?,
        practice_name: row.get("practice_name")?,
    })
}
