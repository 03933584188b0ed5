use chrono::{DateTime, Utc};
use shared::{
    domain::{
        Actor, Application, ApplicationKind, ApplicationStatus, Certificate, Meeting, MeetingId,
        MeetingStatus, Message, Role,
    },
    protocol::{MeetingDraft, MeetingPatch},
};
use tracing::debug;

use crate::{
    action::{Action, ActionKind, Advisory, CertificateAttachment, Transition},
    error::LifecycleError,
};

/// Application record after an accepted action, plus any advisories it raised.
#[derive(Debug, Clone)]
pub struct Applied {
    pub application: Application,
    pub advisories: Vec<Advisory>,
}

/// Action kinds `actor` may start on `application`, ignoring input.
pub fn available_actions(application: &Application, actor: &Actor) -> Vec<ActionKind> {
    ActionKind::ALL
        .into_iter()
        .filter(|kind| authorize(application, actor, *kind).is_ok())
        .collect()
}

/// Role and state checks for an action kind. Input is checked by [`validate`].
pub fn authorize(
    application: &Application,
    actor: &Actor,
    kind: ActionKind,
) -> Result<(), LifecycleError> {
    ensure_role(application, actor, kind)?;
    ensure_state(application, kind)
}

/// Full check of a concrete action. Returns the resulting status transition.
pub fn validate(
    application: &Application,
    actor: &Actor,
    action: &Action,
) -> Result<Transition, LifecycleError> {
    let result = authorize(application, actor, action.kind())
        .and_then(|()| validate_input(application, actor, action))
        .map(|()| Transition {
            from: application.status,
            to: next_status(application.status, action),
            advisories: advisories(application, action),
        });
    if let Err(err) = &result {
        debug!(
            application_id = %application.id,
            actor_id = %actor.id,
            action = %action.kind(),
            %err,
            "lifecycle action rejected"
        );
    }
    result
}

/// Validates `action` and returns the updated record. `application` is never touched,
/// so a rejection leaves no partial change behind.
pub fn apply(
    application: &Application,
    actor: &Actor,
    action: &Action,
    now: DateTime<Utc>,
) -> Result<Applied, LifecycleError> {
    let transition = validate(application, actor, action)?;
    let mut next = application.clone();

    match action {
        Action::AssignOfficiant { officiant_id } | Action::ReassignOfficiant { officiant_id } => {
            next.assigned_officiant = Some(officiant_id.clone());
        }
        Action::AddMeeting(draft) => next.meetings.push(new_meeting(draft)),
        Action::UpdateMeeting { meeting_id, patch } => {
            if let Some(meeting) = next.meetings.iter_mut().find(|m| &m.id == meeting_id) {
                patch_meeting(meeting, patch);
            }
        }
        Action::IssueCertificate { number, attachment } => {
            next.certificate = Some(Certificate {
                number: number.trim().to_string(),
                issued_date: now.date_naive(),
                issued_by: next
                    .assigned_officiant
                    .clone()
                    .unwrap_or_else(|| actor.id.clone()),
                document_name: attachment.as_ref().map(|a| a.filename.clone()),
            });
        }
        Action::RegenerateCertificate { number } => {
            if let Some(certificate) = next.certificate.as_mut() {
                certificate.number = number.trim().to_string();
                certificate.issued_date = now.date_naive();
            }
        }
        Action::Complete { notes } => {
            next.completion_notes = notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
        }
        Action::Cancel { reason } => {
            next.cancellation_reason = Some(reason.trim().to_string());
        }
        Action::AddFeedback { comment } => {
            next.feedback_thread.push(Message {
                author: actor.clone(),
                comment: comment.trim().to_string(),
                date: now,
            });
            // Appending to the thread is not a mutation of the application itself.
            return Ok(Applied {
                application: next,
                advisories: transition.advisories,
            });
        }
    }

    next.status = transition.to;
    next.updated_at = now;
    Ok(Applied {
        application: next,
        advisories: transition.advisories,
    })
}

fn ensure_role(
    application: &Application,
    actor: &Actor,
    kind: ActionKind,
) -> Result<(), LifecycleError> {
    let is_admin = actor.role == Role::Admin;
    let is_assigned_officiant =
        actor.role == Role::Officiant && application.is_assigned_to(&actor.id);
    let is_requester = actor.role == Role::Requester && application.requester_id == actor.id;

    let allowed = match kind {
        ActionKind::AssignOfficiant
        | ActionKind::ReassignOfficiant
        | ActionKind::RegenerateCertificate
        | ActionKind::Cancel => is_admin,
        ActionKind::AddMeeting
        | ActionKind::UpdateMeeting
        | ActionKind::IssueCertificate
        | ActionKind::Complete => is_admin || is_assigned_officiant,
        ActionKind::AddFeedback => is_admin || is_assigned_officiant || is_requester,
    };
    if allowed {
        return Ok(());
    }

    let reason = match actor.role {
        Role::Officiant if !is_assigned_officiant => {
            format!("officiant {} is not assigned to this application", actor.id)
        }
        Role::Requester if !is_requester => {
            format!("user {} is not a participant of this application", actor.id)
        }
        role => format!("{role:?} cannot {kind}").to_lowercase(),
    };
    Err(LifecycleError::permission(reason))
}

fn ensure_state(application: &Application, kind: ActionKind) -> Result<(), LifecycleError> {
    let status = application.status;
    let active = matches!(
        status,
        ApplicationStatus::Assigned | ApplicationStatus::InProgress
    );

    match kind {
        ActionKind::AssignOfficiant => {
            if status != ApplicationStatus::Pending {
                return Err(status_error(kind, status));
            }
        }
        ActionKind::ReassignOfficiant => {
            if !active {
                return Err(status_error(kind, status));
            }
        }
        ActionKind::AddMeeting | ActionKind::UpdateMeeting => {
            require_kind(application, ApplicationKind::Reservation, kind)?;
            if !active {
                return Err(status_error(kind, status));
            }
            require_officiant(application)?;
        }
        ActionKind::IssueCertificate => {
            require_kind(application, ApplicationKind::Certificate, kind)?;
            if !active {
                return Err(status_error(kind, status));
            }
            require_officiant(application)?;
            if application.certificate.is_some() {
                return Err(LifecycleError::state("a certificate has already been issued"));
            }
        }
        ActionKind::RegenerateCertificate => {
            require_kind(application, ApplicationKind::Certificate, kind)?;
            if status == ApplicationStatus::Cancelled {
                return Err(status_error(kind, status));
            }
            if application.certificate.is_none() {
                return Err(LifecycleError::state("no certificate has been issued yet"));
            }
        }
        ActionKind::Complete => {
            if !active {
                return Err(status_error(kind, status));
            }
            require_officiant(application)?;
        }
        ActionKind::Cancel => {
            if status.is_terminal() {
                return Err(status_error(kind, status));
            }
        }
        ActionKind::AddFeedback => {}
    }
    Ok(())
}

fn validate_input(
    application: &Application,
    actor: &Actor,
    action: &Action,
) -> Result<(), LifecycleError> {
    match action {
        Action::AssignOfficiant { officiant_id } | Action::ReassignOfficiant { officiant_id } => {
            require_text("officiant id", officiant_id.as_str())
        }
        Action::AddMeeting(draft) => validate_draft(draft),
        Action::UpdateMeeting { meeting_id, patch } => {
            validate_patch(application, meeting_id, patch)
        }
        Action::IssueCertificate { number, attachment } => {
            require_text("certificate number", number)?;
            match attachment {
                Some(attachment) => validate_attachment(attachment),
                None if actor.role == Role::Officiant => Err(LifecycleError::validation(
                    "a certificate file is required when uploading",
                )),
                None => Ok(()),
            }
        }
        Action::RegenerateCertificate { number } => require_text("certificate number", number),
        Action::Complete { .. } => Ok(()),
        Action::Cancel { reason } => require_text("cancellation reason", reason),
        Action::AddFeedback { comment } => require_text("comment", comment),
    }
}

fn validate_draft(draft: &MeetingDraft) -> Result<(), LifecycleError> {
    require_text("meeting date", &draft.date)?;
    require_text("meeting time", &draft.time)?;
    require_text("meeting location", &draft.location)
}

fn validate_patch(
    application: &Application,
    meeting_id: &MeetingId,
    patch: &MeetingPatch,
) -> Result<(), LifecycleError> {
    let meeting = application.meeting(meeting_id).ok_or_else(|| {
        LifecycleError::validation(format!("unknown meeting {meeting_id}"))
    })?;
    for (field, value) in [
        ("meeting date", &patch.date),
        ("meeting time", &patch.time),
        ("meeting location", &patch.location),
    ] {
        if let Some(value) = value {
            require_text(field, value)?;
        }
    }
    // Checked against the meeting as it will be after the patch.
    let status = patch.status.unwrap_or(meeting.status);
    if status.requires_outcome_notes() {
        let notes = patch
            .completed_notes
            .as_deref()
            .or(meeting.completed_notes.as_deref())
            .unwrap_or_default();
        require_text("completed notes", notes)?;
    }
    Ok(())
}

fn validate_attachment(attachment: &CertificateAttachment) -> Result<(), LifecycleError> {
    require_text("certificate file name", &attachment.filename)?;
    if attachment.bytes.is_empty() {
        return Err(LifecycleError::validation("certificate file is empty"));
    }
    Ok(())
}

fn next_status(current: ApplicationStatus, action: &Action) -> ApplicationStatus {
    match action {
        Action::AssignOfficiant { .. } => ApplicationStatus::Assigned,
        Action::AddMeeting(_) | Action::IssueCertificate { .. } => ApplicationStatus::InProgress,
        Action::Complete { .. } => ApplicationStatus::Completed,
        Action::Cancel { .. } => ApplicationStatus::Cancelled,
        Action::ReassignOfficiant { .. }
        | Action::UpdateMeeting { .. }
        | Action::RegenerateCertificate { .. }
        | Action::AddFeedback { .. } => current,
    }
}

fn advisories(application: &Application, action: &Action) -> Vec<Advisory> {
    if !matches!(action, Action::Complete { .. }) {
        return Vec::new();
    }
    match application.kind {
        ApplicationKind::Certificate if application.certificate.is_none() => {
            vec![Advisory::CertificateMissing]
        }
        ApplicationKind::Reservation => match application.scheduled_meetings().count() {
            0 => Vec::new(),
            count => vec![Advisory::ScheduledMeetingsRemain { count }],
        },
        ApplicationKind::Certificate => Vec::new(),
    }
}

fn new_meeting(draft: &MeetingDraft) -> Meeting {
    Meeting {
        id: MeetingId::generate(),
        date: draft.date.trim().to_string(),
        time: draft.time.trim().to_string(),
        location: draft.location.trim().to_string(),
        notes: draft.notes.clone(),
        status: MeetingStatus::Scheduled,
        completed_notes: None,
    }
}

fn patch_meeting(meeting: &mut Meeting, patch: &MeetingPatch) {
    if let Some(status) = patch.status {
        meeting.status = status;
    }
    if let Some(date) = &patch.date {
        meeting.date = date.trim().to_string();
    }
    if let Some(time) = &patch.time {
        meeting.time = time.trim().to_string();
    }
    if let Some(location) = &patch.location {
        meeting.location = location.trim().to_string();
    }
    if let Some(notes) = &patch.notes {
        meeting.notes = Some(notes.clone());
    }
    if let Some(completed_notes) = &patch.completed_notes {
        meeting.completed_notes = Some(completed_notes.trim().to_string());
    }
}

fn require_text(field: &str, value: &str) -> Result<(), LifecycleError> {
    if value.trim().is_empty() {
        return Err(LifecycleError::validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_officiant(application: &Application) -> Result<(), LifecycleError> {
    if application.assigned_officiant.is_none() {
        return Err(LifecycleError::state("no officiant is assigned"));
    }
    Ok(())
}

fn require_kind(
    application: &Application,
    expected: ApplicationKind,
    kind: ActionKind,
) -> Result<(), LifecycleError> {
    if application.kind != expected {
        return Err(LifecycleError::state(format!(
            "cannot {kind} on a {} application",
            application.kind.label().to_lowercase()
        )));
    }
    Ok(())
}

fn status_error(kind: ActionKind, status: ApplicationStatus) -> LifecycleError {
    LifecycleError::state(format!(
        "cannot {kind} while application is {}",
        status.label().to_lowercase()
    ))
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
