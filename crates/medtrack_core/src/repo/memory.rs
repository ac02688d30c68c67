//! In-memory repositories for tests and UI previews.
//!
//! Records live in insertion order; listings use a stable sort so ties keep
//! that order, matching the SQLite implementations.

use crate::model::appointment::{Appointment, AppointmentId};
use crate::model::doctor::{doctor_match_key, Doctor, DoctorId};
use crate::repo::appointment_repo::{
    AppointmentListQuery, AppointmentRepository, AppointmentSortKey,
};
use crate::repo::doctor_repo::{DoctorListQuery, DoctorRepository, DoctorSortKey};
use crate::repo::{RepoError, RepoResult, SortOrder};
use std::cell::RefCell;
use std::cmp::Ordering;

#[derive(Debug, Default)]
pub struct InMemoryAppointmentRepository {
    rows: RefCell<Vec<Appointment>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AppointmentRepository for InMemoryAppointmentRepository {
    fn insert_appointment(&self, appointment: &Appointment) -> RepoResult<AppointmentId> {
        let mut rows = self.rows.borrow_mut();
        if rows.iter().any(|row| row.id == appointment.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate appointment id {}",
                appointment.id
            )));
        }
        rows.push(appointment.clone());
        Ok(appointment.id)
    }

    fn update_appointment(&self, appointment: &Appointment) -> RepoResult<()> {
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .iter_mut()
            .find(|row| row.id == appointment.id)
            .ok_or(RepoError::NotFound(appointment.id))?;
        *row = appointment.clone();
        Ok(())
    }

    fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>> {
        Ok(self.rows.borrow().iter().find(|row| row.id == id).cloned())
    }

    fn list_appointments(&self, query: &AppointmentListQuery) -> RepoResult<Vec<Appointment>> {
        let mut rows = self.rows.borrow().clone();
        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                AppointmentSortKey::AppointmentDate => a.appointment_date.cmp(&b.appointment_date),
                AppointmentSortKey::PracticeName => a.practice_name.cmp(&b.practice_name),
                AppointmentSortKey::DoctorName => a.doctor_name.cmp(&b.doctor_name),
            };
            directed(ordering, query.order)
        });
        Ok(rows)
    }

    fn delete_appointment(&self, id: AppointmentId) -> RepoResult<bool> {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDoctorRepository {
    rows: RefCell<Vec<Doctor>>,
}

impl InMemoryDoctorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DoctorRepository for InMemoryDoctorRepository {
    fn insert_doctor(&self, doctor: &Doctor) -> RepoResult<DoctorId> {
        let mut rows = self.rows.borrow_mut();
        if rows.iter().any(|row| row.id == doctor.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate doctor id {}",
                doctor.id
            )));
        }
        rows.push(doctor.clone());
        Ok(doctor.id)
    }

    fn get_doctor(&self, id: DoctorId) -> RepoResult<Option<Doctor>> {
        Ok(self.rows.borrow().iter().find(|row| row.id == id).cloned())
    }

    fn find_doctor(&self, name: &str, practice_name: &str) -> RepoResult<Option<Doctor>> {
        let key = doctor_match_key(name, practice_name);
        Ok(self
            .rows
            .borrow()
            .iter()
            .find(|row| row.match_key() == key)
            .cloned())
    }

    fn list_doctors(&self, query: &DoctorListQuery) -> RepoResult<Vec<Doctor>> {
        let mut rows = self.rows.borrow().clone();
        rows.sort_by(|a, b| {
            let ordering = match query.sort {
                DoctorSortKey::Name => a.name.cmp(&b.name),
                DoctorSortKey::PracticeName => a.practice_name.cmp(&b.practice_name),
            };
            directed(ordering, query.order)
        });
        Ok(rows)
    }

    fn delete_doctor(&self, id: DoctorId) -> RepoResult<bool> {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        Ok(rows.len() != before)
    }
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryAppointmentRepository, InMemoryDoctorRepository};
    use crate::model::appointment::{Appointment, AppointmentFields};
    use crate::model::doctor::Doctor;
    use crate::repo::appointment_repo::{AppointmentListQuery, AppointmentRepository};
    use crate::repo::doctor_repo::DoctorRepository;
    use crate::repo::RepoError;

    fn appointment(date: i64, reason: &str) -> Appointment {
        Appointment::new(AppointmentFields::new("Clinic", date, reason, "Dr. Smith"))
    }

    #[test]
    fn equal_dates_keep_insertion_order_when_descending() {
        let repo = InMemoryAppointmentRepository::new();
        let first = appointment(100, "first");
        let second = appointment(100, "second");
        let later = appointment(200, "later");
        repo.insert_appointment(&first).unwrap();
        repo.insert_appointment(&second).unwrap();
        repo.insert_appointment(&later).unwrap();

        let listed = repo
            .list_appointments(&AppointmentListQuery::newest_first())
            .unwrap();
        let ids: Vec<_> = listed.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![later.id, first.id, second.id]);
    }

    #[test]
    fn update_missing_appointment_is_not_found() {
        let repo = InMemoryAppointmentRepository::new();
        let missing = appointment(1, "missing");
        let err = repo.update_appointment(&missing).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(id) if id == missing.id));
    }

    #[test]
    fn delete_reports_whether_a_row_was_removed() {
        let repo = InMemoryAppointmentRepository::new();
        let row = appointment(1, "x");
        repo.insert_appointment(&row).unwrap();
        assert!(repo.delete_appointment(row.id).unwrap());
        assert!(!repo.delete_appointment(row.id).unwrap());
    }

    #[test]
    fn find_doctor_uses_normalized_labels() {
        let repo = InMemoryDoctorRepository::new();
        let doctor = Doctor::new("Dr. Smith", "Sample Clinic");
        repo.insert_doctor(&doctor).unwrap();

        let found = repo.find_doctor("dr.  smith", " sample clinic").unwrap();
        assert_eq!(found.map(|d| d.id), Some(doctor.id));
    }
}
