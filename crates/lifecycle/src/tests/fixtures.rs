use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use shared::domain::{
    Actor, Application, ApplicationId, ApplicationKind, ApplicationStatus, Certificate, Meeting,
    MeetingId, MeetingStatus, Person, Role, UserId,
};

pub const OFFICIANT: &str = "off-1";
pub const REQUESTER: &str = "user-1";

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap()
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 20, 14, 30, 0).unwrap()
}

pub fn admin() -> Actor {
    Actor::new("admin-1", Role::Admin)
}

pub fn officiant() -> Actor {
    Actor::new(OFFICIANT, Role::Officiant)
}

pub fn requester() -> Actor {
    Actor::new(REQUESTER, Role::Requester)
}

pub fn application(kind: ApplicationKind, status: ApplicationStatus) -> Application {
    let assigned_officiant = (status != ApplicationStatus::Pending).then(|| UserId::new(OFFICIANT));
    Application {
        id: ApplicationId::new("app-1"),
        kind,
        status,
        requester_id: UserId::new(REQUESTER),
        partner_one: Person::named("Yusuf"),
        partner_two: Person::named("Maryam"),
        assigned_officiant,
        meetings: Vec::new(),
        certificate: None,
        feedback_thread: Vec::new(),
        completion_notes: None,
        cancellation_reason: None,
        created_at: created_at(),
        updated_at: created_at(),
    }
}

pub fn reservation(status: ApplicationStatus) -> Application {
    application(ApplicationKind::Reservation, status)
}

pub fn certificate_request(status: ApplicationStatus) -> Application {
    application(ApplicationKind::Certificate, status)
}

pub fn meeting(id: &str, status: MeetingStatus) -> Meeting {
    Meeting {
        id: MeetingId::new(id),
        date: "2025-06-01".into(),
        time: "10:00".into(),
        location: "Masjid A".into(),
        notes: None,
        status,
        completed_notes: None,
    }
}

pub fn issued_certificate() -> Certificate {
    Certificate {
        number: "CERT-001".into(),
        issued_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
        issued_by: UserId::new(OFFICIANT),
        document_name: None,
    }
}
