use super::*;
use crate::fixtures::*;
use shared::domain::{MeetingStatus, Role};

fn directory() -> Vec<Officiant> {
    vec![Officiant {
        id: UserId::new(OFFICIANT),
        name: "Shaykh Abdullah".into(),
        years_of_experience: 12,
        institution: "Central Mosque".into(),
    }]
}

#[test]
fn capabilities_mirror_available_actions() {
    let app = certificate_request(ApplicationStatus::InProgress);

    let admin_caps = Capabilities::for_actor(&app, &admin());
    assert!(admin_caps.issue_certificate);
    assert!(admin_caps.cancel);
    assert!(!admin_caps.assign_officiant);
    assert!(!admin_caps.add_meeting);

    let officiant_caps = Capabilities::for_actor(&app, &officiant());
    assert!(officiant_caps.issue_certificate);
    assert!(officiant_caps.complete);
    assert!(!officiant_caps.cancel);

    for kind in ActionKind::ALL {
        assert_eq!(
            admin_caps.allows(kind),
            available_actions(&app, &admin()).contains(&kind)
        );
    }
}

#[test]
fn next_step_for_pending_application() {
    let app = reservation(ApplicationStatus::Pending);
    assert_eq!(NextStep::for_actor(&app, &admin()), NextStep::AssignOfficiant);
    assert_eq!(
        NextStep::for_actor(&app, &requester()),
        NextStep::AwaitAssignment
    );
}

#[test]
fn next_step_walks_reservation_meetings() {
    let mut app = reservation(ApplicationStatus::Assigned);
    assert_eq!(
        NextStep::for_actor(&app, &officiant()),
        NextStep::ScheduleMeeting
    );

    app.status = ApplicationStatus::InProgress;
    app.meetings.push(meeting("m-1", MeetingStatus::Completed));
    app.meetings.push(meeting("m-2", MeetingStatus::Scheduled));
    assert_eq!(
        NextStep::for_actor(&app, &officiant()),
        NextStep::RecordMeetingOutcome {
            meeting_id: MeetingId::new("m-2")
        }
    );

    app.meetings[1].status = MeetingStatus::Completed;
    assert_eq!(NextStep::for_actor(&app, &officiant()), NextStep::Complete);
    assert_eq!(
        NextStep::for_actor(&app, &requester()),
        NextStep::AwaitOfficiant
    );
}

#[test]
fn next_step_for_certificate_request() {
    let mut app = certificate_request(ApplicationStatus::Assigned);
    assert_eq!(NextStep::for_actor(&app, &admin()), NextStep::IssueCertificate);

    app.certificate = Some(issued_certificate());
    assert_eq!(NextStep::for_actor(&app, &admin()), NextStep::Complete);

    app.status = ApplicationStatus::Completed;
    let step = NextStep::for_actor(&app, &admin());
    assert_eq!(step, NextStep::Closed(ApplicationStatus::Completed));
    assert_eq!(step.describe(), "Closed (completed)");
}

#[test]
fn unassigned_officiant_only_waits() {
    let app = reservation(ApplicationStatus::Assigned);
    let other = Actor::new("off-7", Role::Officiant);
    assert_eq!(NextStep::for_actor(&app, &other), NextStep::AwaitOfficiant);
    assert_eq!(Capabilities::for_actor(&app, &other), Capabilities::default());
}

#[test]
fn certificate_document_uses_officiant_directory() {
    let mut app = certificate_request(ApplicationStatus::Completed);
    app.certificate = Some(issued_certificate());

    let document = CertificateDocument::from_application(&app, &directory()).expect("document");
    assert_eq!(document.certificate_number, "CERT-001");
    assert_eq!(document.officiant_name, "Shaykh Abdullah");
    assert_eq!(
        document.officiant_institution.as_deref(),
        Some("Central Mosque")
    );
    assert_eq!(document.partner_two.name, "Maryam");

    let json = serde_json::to_value(&document).expect("encode");
    assert_eq!(json["issued_date"], "2025-05-10");

    let fallback = CertificateDocument::from_application(&app, &[]).expect("document");
    assert_eq!(fallback.officiant_name, OFFICIANT);
    assert!(fallback.officiant_institution.is_none());
}

#[test]
fn certificate_document_requires_issued_certificate() {
    let app = certificate_request(ApplicationStatus::InProgress);
    let err = CertificateDocument::from_application(&app, &directory()).expect_err("missing");
    assert_eq!(err.kind(), crate::ErrorKind::State);

    let reservation_app = reservation(ApplicationStatus::Completed);
    assert!(CertificateDocument::from_application(&reservation_app, &directory()).is_err());
}
