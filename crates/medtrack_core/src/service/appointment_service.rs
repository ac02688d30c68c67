//! Appointment use-case service.
//!
//! # Responsibility
//! - List, add, edit and delete appointments on top of the repositories.
//! - Keep the doctor registry in step with the labels appointments use.
//! - Publish a `StoreEvent` after every committed mutation.
//!
//! # Invariants
//! - Position-based deletes resolve every position against one snapshot
//!   before the first delete is issued.
//! - An out-of-range position rejects the whole batch; nothing is deleted.
//! - The remembered listing is dropped on add/edit, since either may reorder.
//! - Doctor registration never fails an appointment write that committed.

use crate::events::{EventHub, StoreEvent};
use crate::model::appointment::{Appointment, AppointmentFields, AppointmentId};
use crate::model::doctor::{Doctor, DoctorId};
use crate::repo::appointment_repo::{AppointmentListQuery, AppointmentRepository};
use crate::repo::doctor_repo::{DoctorListQuery, DoctorRepository};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;

/// Service error for appointment use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// A delete position does not exist in the snapshot it was resolved on.
    PositionOutOfRange { position: usize, len: usize },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PositionOutOfRange { position, len } => write!(
                f,
                "position {position} is out of range for a listing of {len} appointment(s)"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::PositionOutOfRange { .. } => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Immutable snapshot of the appointment list as it was rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentListing {
    items: Vec<Appointment>,
}

impl AppointmentListing {
    pub fn new(items: Vec<Appointment>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Appointment> {
        self.items.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Appointment> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Appointment] {
        &self.items
    }

    /// Maps positions to ids. Duplicates collapse; ids come back in listing
    /// order.
    ///
    /// # Errors
    /// - `PositionOutOfRange` for the first position past the end.
    pub fn resolve(&self, positions: &[usize]) -> Result<Vec<AppointmentId>, ServiceError> {
        let unique: BTreeSet<usize> = positions.iter().copied().collect();
        unique
            .into_iter()
            .map(|position| {
                self.items
                    .get(position)
                    .map(|appointment| appointment.id)
                    .ok_or(ServiceError::PositionOutOfRange {
                        position,
                        len: self.items.len(),
                    })
            })
            .collect()
    }

    fn without(&self, removed: &[AppointmentId]) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|appointment| !removed.contains(&appointment.id))
                .cloned()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AppointmentListing {
    type Item = &'a Appointment;
    type IntoIter = std::slice::Iter<'a, Appointment>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Appointment lifecycle service over appointment and doctor repositories.
pub struct AppointmentService<A: AppointmentRepository, D: DoctorRepository> {
    appointments: A,
    doctors: D,
    events: EventHub,
    last_listing: RefCell<Option<AppointmentListing>>,
}

impl<A: AppointmentRepository, D: DoctorRepository> AppointmentService<A, D> {
    pub fn new(appointments: A, doctors: D) -> Self {
        Self {
            appointments,
            doctors,
            events: EventHub::new(),
            last_listing: RefCell::new(None),
        }
    }

    /// Subscribes to committed changes. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Lists all appointments, most recent date first, and remembers the
    /// result as the snapshot for position-based deletes.
    pub fn list_appointments(&self) -> RepoResult<AppointmentListing> {
        let items = self
            .appointments
            .list_appointments(&AppointmentListQuery::newest_first())?;
        let listing = AppointmentListing::new(items);
        *self.last_listing.borrow_mut() = Some(listing.clone());
        Ok(listing)
    }

    /// Returns the remembered snapshot, if any.
    pub fn last_listing(&self) -> Option<AppointmentListing> {
        self.last_listing.borrow().clone()
    }

    /// Reinstates a snapshot taken by an earlier service instance over the
    /// same store.
    pub fn restore_listing(&self, listing: Option<AppointmentListing>) {
        *self.last_listing.borrow_mut() = listing;
    }

    pub fn get_appointment(&self, id: AppointmentId) -> RepoResult<Option<Appointment>> {
        self.appointments.get_appointment(id)
    }

    /// Creates an appointment and registers its doctor when unseen.
    ///
    /// Field contents are not validated here. A failed doctor registration
    /// is logged and does not fail the call; the appointment is committed.
    pub fn add_appointment(&self, fields: AppointmentFields) -> RepoResult<Appointment> {
        let appointment = Appointment::new(fields);
        self.appointments.insert_appointment(&appointment)?;
        self.last_listing.borrow_mut().take();
        info!(
            "event=appointment_create module=service status=ok appointment_id={}",
            appointment.id
        );
        self.events.publish(StoreEvent::AppointmentCreated(appointment.id));

        self.sync_doctor(&appointment);
        Ok(appointment)
    }

    /// Replaces all four fields of an existing appointment; the id is kept.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist.
    pub fn edit_appointment(
        &self,
        id: AppointmentId,
        fields: AppointmentFields,
    ) -> RepoResult<Appointment> {
        let mut appointment = self
            .appointments
            .get_appointment(id)?
            .ok_or(RepoError::NotFound(id))?;
        appointment.apply(fields);
        self.appointments.update_appointment(&appointment)?;
        self.last_listing.borrow_mut().take();
        info!(
            "event=appointment_update module=service status=ok appointment_id={}",
            appointment.id
        );
        self.events.publish(StoreEvent::AppointmentUpdated(appointment.id));

        self.sync_doctor(&appointment);
        Ok(appointment)
    }

    /// Deletes one appointment. Returns `false` when it was already absent.
    ///
    /// The id is dropped from the remembered listing so later positions
    /// still match what is shown.
    pub fn delete_appointment(&self, id: AppointmentId) -> RepoResult<bool> {
        let removed = self.remove_appointment(id)?;
        if let Some(current) = self.last_listing.borrow_mut().as_mut() {
            *current = current.without(&[id]);
        }
        Ok(removed)
    }

    fn remove_appointment(&self, id: AppointmentId) -> RepoResult<bool> {
        let removed = self.appointments.delete_appointment(id)?;
        if removed {
            info!(
                "event=appointment_delete module=service status=ok appointment_id={}",
                id
            );
            self.events.publish(StoreEvent::AppointmentDeleted(id));
        }
        Ok(removed)
    }

    /// Deletes the appointments at `positions` of the last listing returned
    /// by [`Self::list_appointments`], taking a fresh one if none is held.
    ///
    /// Returns the ids that were removed, in listing order.
    pub fn delete_appointments(
        &self,
        positions: &[usize],
    ) -> Result<Vec<AppointmentId>, ServiceError> {
        let snapshot = self.last_listing.borrow().clone();
        let listing = match snapshot {
            Some(listing) => listing,
            None => self.list_appointments()?,
        };
        self.delete_from_listing(&listing, positions)
    }

    /// Deletes the appointments at `positions` of an explicit snapshot.
    ///
    /// # Errors
    /// - `PositionOutOfRange` before anything is deleted.
    pub fn delete_from_listing(
        &self,
        listing: &AppointmentListing,
        positions: &[usize],
    ) -> Result<Vec<AppointmentId>, ServiceError> {
        let targets = listing.resolve(positions)?;

        let mut removed = Vec::with_capacity(targets.len());
        for id in targets {
            if self.remove_appointment(id)? {
                removed.push(id);
            }
        }

        // Deletes never reorder survivors, so the snapshot stays usable.
        if let Some(current) = self.last_listing.borrow_mut().as_mut() {
            *current = current.without(&removed);
        }
        info!(
            "event=appointment_batch_delete module=service status=ok requested={} removed={}",
            positions.len(),
            removed.len()
        );

        Ok(removed)
    }

    /// Returns the doctor for the labels, creating it when unseen.
    ///
    /// Blank labels are not registered and yield `None`.
    pub fn register_doctor(&self, name: &str, practice_name: &str) -> RepoResult<Option<Doctor>> {
        if name.trim().is_empty() || practice_name.trim().is_empty() {
            return Ok(None);
        }
        if let Some(existing) = self.doctors.find_doctor(name, practice_name)? {
            return Ok(Some(existing));
        }

        let doctor = Doctor::new(name.trim(), practice_name.trim());
        self.doctors.insert_doctor(&doctor)?;
        info!(
            "event=doctor_create module=service status=ok doctor_id={}",
            doctor.id
        );
        self.events.publish(StoreEvent::DoctorCreated(doctor.id));
        Ok(Some(doctor))
    }

    fn sync_doctor(&self, appointment: &Appointment) {
        if let Err(err) = self.register_doctor(&appointment.doctor_name, &appointment.practice_name)
        {
            warn!(
                "event=doctor_create module=service status=error appointment_id={} error={}",
                appointment.id, err
            );
        }
    }

    pub fn list_doctors(&self) -> RepoResult<Vec<Doctor>> {
        self.doctors.list_doctors(&DoctorListQuery::default())
    }

    /// Deletes a doctor record. Appointments are never affected.
    pub fn delete_doctor(&self, id: DoctorId) -> RepoResult<bool> {
        let removed = self.doctors.delete_doctor(id)?;
        if removed {
            self.events.publish(StoreEvent::DoctorDeleted(id));
        }
        Ok(removed)
    }
}
