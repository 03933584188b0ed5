use std::fmt;

use shared::{
    domain::{ApplicationStatus, MeetingId, UserId},
    protocol::{MeetingDraft, MeetingPatch},
};

/// A file attached when an officiant uploads a signed certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateAttachment {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for CertificateAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateAttachment")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AssignOfficiant {
        officiant_id: UserId,
    },
    ReassignOfficiant {
        officiant_id: UserId,
    },
    AddMeeting(MeetingDraft),
    UpdateMeeting {
        meeting_id: MeetingId,
        patch: MeetingPatch,
    },
    /// Number-only generation when `attachment` is `None`, file upload otherwise.
    IssueCertificate {
        number: String,
        attachment: Option<CertificateAttachment>,
    },
    RegenerateCertificate {
        number: String,
    },
    Complete {
        notes: Option<String>,
    },
    Cancel {
        reason: String,
    },
    AddFeedback {
        comment: String,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::AssignOfficiant { .. } => ActionKind::AssignOfficiant,
            Self::ReassignOfficiant { .. } => ActionKind::ReassignOfficiant,
            Self::AddMeeting(_) => ActionKind::AddMeeting,
            Self::UpdateMeeting { .. } => ActionKind::UpdateMeeting,
            Self::IssueCertificate { .. } => ActionKind::IssueCertificate,
            Self::RegenerateCertificate { .. } => ActionKind::RegenerateCertificate,
            Self::Complete { .. } => ActionKind::Complete,
            Self::Cancel { .. } => ActionKind::Cancel,
            Self::AddFeedback { .. } => ActionKind::AddFeedback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    AssignOfficiant,
    ReassignOfficiant,
    AddMeeting,
    UpdateMeeting,
    IssueCertificate,
    RegenerateCertificate,
    Complete,
    Cancel,
    AddFeedback,
}

impl ActionKind {
    pub const ALL: [ActionKind; 9] = [
        Self::AssignOfficiant,
        Self::ReassignOfficiant,
        Self::AddMeeting,
        Self::UpdateMeeting,
        Self::IssueCertificate,
        Self::RegenerateCertificate,
        Self::Complete,
        Self::Cancel,
        Self::AddFeedback,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::AssignOfficiant => "assign officiant",
            Self::ReassignOfficiant => "reassign officiant",
            Self::AddMeeting => "add meeting",
            Self::UpdateMeeting => "update meeting",
            Self::IssueCertificate => "issue certificate",
            Self::RegenerateCertificate => "regenerate certificate",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::AddFeedback => "add feedback",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Non-blocking warning raised alongside an accepted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    CertificateMissing,
    ScheduledMeetingsRemain { count: usize },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CertificateMissing => f.write_str("certificate missing"),
            Self::ScheduledMeetingsRemain { count: 1 } => {
                f.write_str("1 scheduled meeting remains")
            }
            Self::ScheduledMeetingsRemain { count } => {
                write!(f, "{count} scheduled meetings remain")
            }
        }
    }
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub advisories: Vec<Advisory>,
}

impl Transition {
    pub fn changes_status(&self) -> bool {
        self.from != self.to
    }
}
