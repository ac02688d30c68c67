//! FFI use-case API for the mobile UI.
//!
//! # Responsibility
//! - Expose list/add/edit/delete appointment flows as sync FRB calls.
//! - Hold the single process-wide store opened by `init_store`.
//! - Validate form input at the boundary before it reaches the core.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - A store that failed recovery is never installed; every later call fails.
//! - Delete positions refer to the listing last returned by
//!   `appointments_list`.

use log::error;
use medtrack_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_store,
    ping as ping_inner, resolve_store_path, Appointment, AppointmentFields, AppointmentListing,
    AppointmentService, Doctor, SqliteAppointmentRepository, SqliteDoctorRepository,
};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

static STORE: StoreSlot = StoreSlot::new();

struct FfiStore {
    path: PathBuf,
    conn: Mutex<Connection>,
    listing: Mutex<Option<AppointmentListing>>,
}

/// Process-wide store state. Once `fatal` is set it is never cleared and
/// `store` is never filled.
struct StoreSlot {
    store: OnceCell<FfiStore>,
    fatal: OnceCell<String>,
}

impl StoreSlot {
    const fn new() -> Self {
        Self {
            store: OnceCell::new(),
            fatal: OnceCell::new(),
        }
    }

    fn init(&self, path: &Path) -> Result<&FfiStore, String> {
        if let Some(message) = self.fatal.get() {
            return Err(message.clone());
        }
        self.store.get_or_try_init(|| match open_store(path) {
            Ok(conn) => Ok(FfiStore {
                path: path.to_path_buf(),
                conn: Mutex::new(conn),
                listing: Mutex::new(None),
            }),
            Err(err) => {
                error!(
                    "event=store_init module=ffi status=error error_code=store_unrecoverable path={}",
                    path.display()
                );
                Err(self.fatal.get_or_init(|| format!("fatal: {err}")).clone())
            }
        })
    }

    fn get(&self) -> Result<&FfiStore, String> {
        if let Some(message) = self.fatal.get() {
            return Err(message.clone());
        }
        self.store
            .get()
            .ok_or_else(|| "store is not initialized; call init_store first".to_string())
    }
}

type FfiService<'conn> =
    AppointmentService<SqliteAppointmentRepository<'conn>, SqliteDoctorRepository<'conn>>;

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
/// Repeating the call with the same `level + log_dir` is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Opens the appointment store once per process.
///
/// `db_path = None` uses `MEDTRACK_DB_PATH` or the platform data directory.
///
/// # FFI contract
/// - Returns an empty string on success and an error message otherwise.
/// - Messages starting with `fatal:` mean the store could not be recovered;
///   the UI must not continue. The same message is returned by this and
///   every other store call for the rest of the process.
/// - Repeating the call with the same path is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn init_store(db_path: Option<String>) -> String {
    let path = db_path
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(resolve_store_path);

    let installed = STORE.init(&path);

    match installed {
        Ok(store) if store.path == path => String::new(),
        Ok(store) => format!(
            "store already initialized at `{}`; refusing to switch to `{}`",
            store.path.display(),
            path.display()
        ),
        Err(message) => message,
    }
}

/// Appointment row for list and detail rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentItem {
    pub appointment_id: String,
    pub practice_name: String,
    /// Unix epoch milliseconds.
    pub appointment_date_ms: i64,
    pub reason: String,
    pub doctor_name: String,
}

/// Doctor row for pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorItem {
    pub doctor_id: String,
    pub name: String,
    pub practice_name: String,
}

/// Response envelope for `appointments_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentListResponse {
    pub ok: bool,
    /// Most recent appointment date first.
    pub items: Vec<AppointmentItem>,
    pub message: String,
}

/// Response envelope for add/edit flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentActionResponse {
    pub ok: bool,
    pub appointment_id: Option<String>,
    pub message: String,
}

impl AppointmentActionResponse {
    fn success(message: impl Into<String>, appointment_id: String) -> Self {
        Self {
            ok: true,
            appointment_id: Some(appointment_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            appointment_id: None,
            message: message.into(),
        }
    }
}

/// Response envelope for `appointments_delete_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDeleteResponse {
    pub ok: bool,
    pub deleted_ids: Vec<String>,
    pub message: String,
}

/// Response envelope for `doctors_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorListResponse {
    pub ok: bool,
    pub items: Vec<DoctorItem>,
    pub message: String,
}

/// Lists all appointments, most recent first, for the list screen.
///
/// The returned order is the one `appointments_delete_at` positions refer to.
#[flutter_rust_bridge::frb(sync)]
pub fn appointments_list() -> AppointmentListResponse {
    match with_service(|service| service.list_appointments().map_err(|err| err.to_string())) {
        Ok(listing) => {
            let items = listing.iter().map(to_appointment_item).collect::<Vec<_>>();
            let message = format!("{} appointment(s).", items.len());
            AppointmentListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => AppointmentListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("appointments_list failed: {err}"),
        },
    }
}

/// Saves the add-appointment form.
///
/// Blank practice name, reason or doctor name is rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn appointment_add(
    practice_name: String,
    appointment_date_ms: i64,
    reason: String,
    doctor_name: String,
) -> AppointmentActionResponse {
    let fields = form_fields(practice_name, appointment_date_ms, reason, doctor_name);
    let result = fields
        .validate()
        .map_err(|err| err.to_string())
        .and_then(|()| {
            with_service(|service| service.add_appointment(fields).map_err(|err| err.to_string()))
        });

    match result {
        Ok(appointment) => {
            AppointmentActionResponse::success("Appointment added.", appointment.id.to_string())
        }
        Err(err) => AppointmentActionResponse::failure(format!("appointment_add failed: {err}")),
    }
}

/// Saves the edit-appointment form, replacing all four fields.
#[flutter_rust_bridge::frb(sync)]
pub fn appointment_edit(
    appointment_id: String,
    practice_name: String,
    appointment_date_ms: i64,
    reason: String,
    doctor_name: String,
) -> AppointmentActionResponse {
    let fields = form_fields(practice_name, appointment_date_ms, reason, doctor_name);
    let result = parse_appointment_id(&appointment_id).and_then(|id| {
        fields.validate().map_err(|err| err.to_string())?;
        with_service(|service| {
            service
                .edit_appointment(id, fields)
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(appointment) => {
            AppointmentActionResponse::success("Appointment updated.", appointment.id.to_string())
        }
        Err(err) => AppointmentActionResponse::failure(format!("appointment_edit failed: {err}")),
    }
}

/// Deletes the appointments at `positions` of the last listed order.
///
/// Swipe-to-delete passes the row offsets it removed. All positions are
/// checked before anything is deleted.
#[flutter_rust_bridge::frb(sync)]
pub fn appointments_delete_at(positions: Vec<u32>) -> AppointmentDeleteResponse {
    let positions = positions
        .into_iter()
        .map(|position| position as usize)
        .collect::<Vec<_>>();

    match with_service(|service| {
        service
            .delete_appointments(&positions)
            .map_err(|err| err.to_string())
    }) {
        Ok(removed) => AppointmentDeleteResponse {
            ok: true,
            message: format!("Deleted {} appointment(s).", removed.len()),
            deleted_ids: removed.iter().map(Uuid::to_string).collect(),
        },
        Err(err) => AppointmentDeleteResponse {
            ok: false,
            deleted_ids: Vec::new(),
            message: format!("appointments_delete_at failed: {err}"),
        },
    }
}

/// Lists registered doctors alphabetically.
#[flutter_rust_bridge::frb(sync)]
pub fn doctors_list() -> DoctorListResponse {
    match with_service(|service| service.list_doctors().map_err(|err| err.to_string())) {
        Ok(doctors) => DoctorListResponse {
            ok: true,
            message: format!("{} doctor(s).", doctors.len()),
            items: doctors.iter().map(to_doctor_item).collect(),
        },
        Err(err) => DoctorListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("doctors_list failed: {err}"),
        },
    }
}

fn with_service<T>(f: impl FnOnce(&FfiService<'_>) -> Result<T, String>) -> Result<T, String> {
    let store = STORE.get()?;
    let conn = store
        .conn
        .lock()
        .map_err(|_| "store connection lock poisoned".to_string())?;
    let appointments = SqliteAppointmentRepository::try_new(&conn)
        .map_err(|err| format!("appointment repo init failed: {err}"))?;
    let doctors = SqliteDoctorRepository::try_new(&conn)
        .map_err(|err| format!("doctor repo init failed: {err}"))?;
    let service = AppointmentService::new(appointments, doctors);

    let mut listing = store
        .listing
        .lock()
        .map_err(|_| "listing lock poisoned".to_string())?;
    service.restore_listing(listing.take());
    let result = f(&service);
    *listing = service.last_listing();
    result
}

fn form_fields(
    practice_name: String,
    appointment_date_ms: i64,
    reason: String,
    doctor_name: String,
) -> AppointmentFields {
    AppointmentFields::new(
        practice_name.trim(),
        appointment_date_ms,
        reason.trim(),
        doctor_name.trim(),
    )
}

fn parse_appointment_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid appointment id `{raw}`"))
}

fn to_appointment_item(appointment: &Appointment) -> AppointmentItem {
    AppointmentItem {
        appointment_id: appointment.id.to_string(),
        practice_name: appointment.practice_name.clone(),
        appointment_date_ms: appointment.appointment_date,
        reason: appointment.reason.clone(),
        doctor_name: appointment.doctor_name.clone(),
    }
}

fn to_doctor_item(doctor: &Doctor) -> DoctorItem {
    DoctorItem {
        doctor_id: doctor.id.to_string(),
        name: doctor.name.clone(),
        practice_name: doctor.practice_name.clone(),
    }
}
