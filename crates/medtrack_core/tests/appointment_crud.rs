use medtrack_core::db::migrations::latest_version;
use medtrack_core::db::open_db_in_memory;
use medtrack_core::{
    Appointment, AppointmentFields, AppointmentListQuery, AppointmentRepository,
    AppointmentSortKey, Doctor, DoctorListQuery, DoctorRepository, RepoError, SortOrder,
    SqliteAppointmentRepository, SqliteDoctorRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn fields(date: i64, reason: &str) -> AppointmentFields {
    AppointmentFields::new("Sample Clinic", date, reason, "Dr. Smith")
}

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppointmentRepository::try_new(&conn).unwrap();

    let appointment = Appointment::new(AppointmentFields::new(
        "Lakeside Family Practice",
        1_718_409_600_000,
        "Follow-up on blood work\nBring previous results",
        "Dr. Okafor",
    ));
    let id = repo.insert_appointment(&appointment).unwrap();

    let loaded = repo.get_appointment(id).unwrap().unwrap();
    assert_eq!(loaded, appointment);
}

#[test]
fn update_replaces_all_fields_and_keeps_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppointmentRepository::try_new(&conn).unwrap();

    let mut appointment = Appointment::new(fields(100, "draft"));
    repo.insert_appointment(&appointment).unwrap();

    appointment.apply(AppointmentFields::new("New Practice", 200, "changed", "Dr. Jones"));
    repo.update_appointment(&appointment).unwrap();

    let loaded = repo.get_appointment(appointment.id).unwrap().unwrap();
    assert_eq!(loaded.id, appointment.id);
    assert_eq!(loaded.practice_name, "New Practice");
    assert_eq!(loaded.appointment_date, 200);
    assert_eq!(loaded.reason, "changed");
    assert_eq!(loaded.doctor_name, "Dr. Jones");
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppointmentRepository::try_new(&conn).unwrap();

    let appointment = Appointment::new(fields(1, "missing"));
    let err = repo.update_appointment(&appointment).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == appointment.id));
}

#[test]
fn delete_of_absent_appointment_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppointmentRepository::try_new(&conn).unwrap();

    let appointment = Appointment::new(fields(1, "once"));
    repo.insert_appointment(&appointment).unwrap();

    assert!(repo.delete_appointment(appointment.id).unwrap());
    assert!(!repo.delete_appointment(appointment.id).unwrap());
    assert!(!repo.delete_appointment(Uuid::new_v4()).unwrap());
    assert!(repo.get_appointment(appointment.id).unwrap().is_none());
}

#[test]
fn default_listing_is_reverse_chronological_with_insertion_tie_break() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppointmentRepository::try_new(&conn).unwrap();

    let tie_first = Appointment::new(fields(500, "tie first"));
    let oldest = Appointment::new(fields(100, "oldest"));
    let tie_second = Appointment::new(fields(500, "tie second"));
    let newest = Appointment::new(fields(900, "newest"));
    for appointment in [&tie_first, &oldest, &tie_second, &newest] {
        repo.insert_appointment(appointment).unwrap();
    }

    let ids: Vec<_> = repo
        .list_appointments(&AppointmentListQuery::newest_first())
        .unwrap()
        .into_iter()
        .map(|appointment| appointment.id)
        .collect();
    assert_eq!(ids, vec![newest.id, tie_first.id, tie_second.id, oldest.id]);
}

#[test]
fn listing_supports_other_sort_keys() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppointmentRepository::try_new(&conn).unwrap();

    let b = Appointment::new(AppointmentFields::new("B Clinic", 1, "x", "Dr. A"));
    let a = Appointment::new(AppointmentFields::new("A Clinic", 2, "y", "Dr. B"));
    repo.insert_appointment(&b).unwrap();
    repo.insert_appointment(&a).unwrap();

    let by_practice = repo
        .list_appointments(&AppointmentListQuery {
            sort: AppointmentSortKey::PracticeName,
            order: SortOrder::Ascending,
        })
        .unwrap();
    assert_eq!(by_practice[0].id, a.id);

    let by_doctor_desc = repo
        .list_appointments(&AppointmentListQuery {
            sort: AppointmentSortKey::DoctorName,
            order: SortOrder::Descending,
        })
        .unwrap();
    assert_eq!(by_doctor_desc[0].id, a.id);
}

#[test]
fn doctor_repository_finds_by_normalized_labels() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDoctorRepository::try_new(&conn).unwrap();

    let smith = Doctor::new("Dr. Smith", "Sample Clinic");
    let adams = Doctor::new("Dr. Adams", "Harbor Health");
    repo.insert_doctor(&smith).unwrap();
    repo.insert_doctor(&adams).unwrap();

    let found = repo.find_doctor("  DR. SMITH", "sample   clinic").unwrap();
    assert_eq!(found, Some(smith.clone()));
    assert!(repo.find_doctor("Dr. Smith", "Other Clinic").unwrap().is_none());

    let names: Vec<_> = repo
        .list_doctors(&DoctorListQuery::default())
        .unwrap()
        .into_iter()
        .map(|doctor| doctor.name)
        .collect();
    assert_eq!(names, vec!["Dr. Adams", "Dr. Smith"]);

    assert!(repo.delete_doctor(smith.id).unwrap());
    assert!(repo.get_doctor(smith.id).unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteAppointmentRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_appointments_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteAppointmentRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("appointments"))
    ));
}

#[test]
fn repository_rejects_doctors_table_missing_match_key() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE doctors (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            practice_name TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteDoctorRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "doctors",
            column: "match_key"
        })
    ));
}

#[test]
fn corrupt_uuid_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO appointments (uuid, practice_name, appointment_date, reason, doctor_name)
         VALUES ('not-a-uuid', 'p', 1, 'r', 'd');",
        [],
    )
    .unwrap();
    let repo = SqliteAppointmentRepository::try_new(&conn).unwrap();

    let err = repo
        .list_appointments(&AppointmentListQuery::default())
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
