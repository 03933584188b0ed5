use chrono::NaiveDate;
use serde::Serialize;
use shared::domain::{
    Actor, Application, ApplicationId, ApplicationKind, ApplicationStatus, MeetingId, Officiant,
    Person, UserId,
};

use crate::{action::ActionKind, engine::available_actions, error::LifecycleError};

/// One flag per action kind, computed once per `(application, actor)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub assign_officiant: bool,
    pub reassign_officiant: bool,
    pub add_meeting: bool,
    pub update_meeting: bool,
    pub issue_certificate: bool,
    pub regenerate_certificate: bool,
    pub complete: bool,
    pub cancel: bool,
    pub add_feedback: bool,
}

impl Capabilities {
    pub fn for_actor(application: &Application, actor: &Actor) -> Self {
        let mut caps = Self::default();
        for kind in available_actions(application, actor) {
            *caps.flag_mut(kind) = true;
        }
        caps
    }

    pub fn allows(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::AssignOfficiant => self.assign_officiant,
            ActionKind::ReassignOfficiant => self.reassign_officiant,
            ActionKind::AddMeeting => self.add_meeting,
            ActionKind::UpdateMeeting => self.update_meeting,
            ActionKind::IssueCertificate => self.issue_certificate,
            ActionKind::RegenerateCertificate => self.regenerate_certificate,
            ActionKind::Complete => self.complete,
            ActionKind::Cancel => self.cancel,
            ActionKind::AddFeedback => self.add_feedback,
        }
    }

    fn flag_mut(&mut self, kind: ActionKind) -> &mut bool {
        match kind {
            ActionKind::AssignOfficiant => &mut self.assign_officiant,
            ActionKind::ReassignOfficiant => &mut self.reassign_officiant,
            ActionKind::AddMeeting => &mut self.add_meeting,
            ActionKind::UpdateMeeting => &mut self.update_meeting,
            ActionKind::IssueCertificate => &mut self.issue_certificate,
            ActionKind::RegenerateCertificate => &mut self.regenerate_certificate,
            ActionKind::Complete => &mut self.complete,
            ActionKind::Cancel => &mut self.cancel,
            ActionKind::AddFeedback => &mut self.add_feedback,
        }
    }
}

/// The single most relevant thing for an actor to do next on an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    AssignOfficiant,
    AwaitAssignment,
    ScheduleMeeting,
    RecordMeetingOutcome { meeting_id: MeetingId },
    IssueCertificate,
    Complete,
    AwaitOfficiant,
    Closed(ApplicationStatus),
}

impl NextStep {
    pub fn for_actor(application: &Application, actor: &Actor) -> Self {
        if application.status.is_terminal() {
            return Self::Closed(application.status);
        }

        let caps = Capabilities::for_actor(application, actor);
        if application.status == ApplicationStatus::Pending {
            return if caps.assign_officiant {
                Self::AssignOfficiant
            } else {
                Self::AwaitAssignment
            };
        }
        if !caps.complete {
            return Self::AwaitOfficiant;
        }

        match application.kind {
            ApplicationKind::Reservation => {
                if application.meetings.is_empty() {
                    Self::ScheduleMeeting
                } else if let Some(meeting) = application.scheduled_meetings().next() {
                    Self::RecordMeetingOutcome {
                        meeting_id: meeting.id.clone(),
                    }
                } else {
                    Self::Complete
                }
            }
            ApplicationKind::Certificate => {
                if application.certificate.is_none() {
                    Self::IssueCertificate
                } else {
                    Self::Complete
                }
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::AssignOfficiant => "Assign an officiant".to_string(),
            Self::AwaitAssignment => "Waiting for an officiant to be assigned".to_string(),
            Self::ScheduleMeeting => "Schedule the first meeting".to_string(),
            Self::RecordMeetingOutcome { meeting_id } => {
                format!("Record the outcome of meeting {meeting_id}")
            }
            Self::IssueCertificate => "Issue the marriage certificate".to_string(),
            Self::Complete => "Mark the application as completed".to_string(),
            Self::AwaitOfficiant => "Waiting for the officiant".to_string(),
            Self::Closed(status) => format!("Closed ({})", status.label().to_lowercase()),
        }
    }
}

/// Data handed to the certificate renderer. Layout is the renderer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateDocument {
    pub application_id: ApplicationId,
    pub certificate_number: String,
    pub issued_date: NaiveDate,
    pub partner_one: Person,
    pub partner_two: Person,
    pub issued_by: UserId,
    pub officiant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub officiant_institution: Option<String>,
}

impl CertificateDocument {
    pub fn from_application(
        application: &Application,
        officiants: &[Officiant],
    ) -> Result<Self, LifecycleError> {
        if application.kind != ApplicationKind::Certificate {
            return Err(LifecycleError::state(
                "only certificate applications produce a certificate document",
            ));
        }
        let certificate = application
            .certificate
            .as_ref()
            .ok_or_else(|| LifecycleError::state("no certificate has been issued yet"))?;
        let officiant = officiants
            .iter()
            .find(|officiant| officiant.id == certificate.issued_by);

        Ok(Self {
            application_id: application.id.clone(),
            certificate_number: certificate.number.clone(),
            issued_date: certificate.issued_date,
            partner_one: application.partner_one.clone(),
            partner_two: application.partner_two.clone(),
            issued_by: certificate.issued_by.clone(),
            officiant_name: officiant
                .map(|o| o.name.clone())
                .unwrap_or_else(|| certificate.issued_by.to_string()),
            officiant_institution: officiant.map(|o| o.institution.clone()),
        })
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
