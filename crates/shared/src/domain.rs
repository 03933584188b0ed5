use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(ApplicationId);
id_newtype!(UserId);
id_newtype!(MeetingId);

impl MeetingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKind {
    Reservation,
    Certificate,
}

impl ApplicationKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Reservation => "Marriage reservation",
            Self::Certificate => "Marriage certificate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        Self::Pending,
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Completed and cancelled applications never change status again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Assigned => "Assigned",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_wire() == normalized)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

impl MeetingStatus {
    /// Closing a meeting (either way) needs a written outcome.
    pub fn requires_outcome_notes(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            "rescheduled" => Some(Self::Rescheduled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Requester,
    Officiant,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "requester" | "user" => Some(Self::Requester),
            "officiant" | "shaykh" => Some(Self::Officiant),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(id),
            role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl Person {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            date_of_birth: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Officiant {
    pub id: UserId,
    pub name: String,
    pub years_of_experience: u32,
    pub institution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: MeetingId,
    pub date: String,
    pub time: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: MeetingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub number: String,
    pub issued_date: NaiveDate,
    pub issued_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: Actor,
    pub comment: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub kind: ApplicationKind,
    pub status: ApplicationStatus,
    pub requester_id: UserId,
    pub partner_one: Person,
    pub partner_two: Person,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_officiant: Option<UserId>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
    #[serde(default)]
    pub feedback_thread: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Meetings keep insertion order, so the first one is simply `meetings[0]`.
    pub fn first_meeting(&self) -> Option<&Meeting> {
        self.meetings.first()
    }

    pub fn scheduled_meetings(&self) -> impl Iterator<Item = &Meeting> {
        self.meetings
            .iter()
            .filter(|meeting| meeting.status == MeetingStatus::Scheduled)
    }

    pub fn meeting(&self, meeting_id: &MeetingId) -> Option<&Meeting> {
        self.meetings.iter().find(|meeting| &meeting.id == meeting_id)
    }

    pub fn is_assigned_to(&self, officiant_id: &UserId) -> bool {
        self.assigned_officiant.as_ref() == Some(officiant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names_match_serde() {
        for status in ApplicationStatus::ALL {
            let encoded = serde_json::to_string(&status).expect("encode");
            assert_eq!(encoded, format!("\"{}\"", status.as_wire()));
            assert_eq!(ApplicationStatus::parse(status.as_wire()), Some(status));
        }
        assert_eq!(
            ApplicationStatus::parse("In Progress"),
            Some(ApplicationStatus::InProgress)
        );
    }

    #[test]
    fn decodes_backend_application_with_missing_collections() {
        let raw = r#"{
            "id": "app-1",
            "kind": "certificate",
            "status": "pending",
            "requester_id": "user-9",
            "partner_one": {"name": "Yusuf", "date_of_birth": "1994-03-02"},
            "partner_two": {"name": "Maryam"},
            "created_at": "2025-05-01T10:00:00Z",
            "updated_at": "2025-05-01T10:00:00Z"
        }"#;
        let app: Application = serde_json::from_str(raw).expect("decode");
        assert_eq!(app.kind, ApplicationKind::Certificate);
        assert!(app.meetings.is_empty());
        assert!(app.feedback_thread.is_empty());
        assert!(app.assigned_officiant.is_none());
        assert_eq!(
            app.partner_one.date_of_birth,
            NaiveDate::from_ymd_opt(1994, 3, 2)
        );
    }

    #[test]
    fn role_parse_accepts_shaykh_alias() {
        assert_eq!(Role::parse("Shaykh"), Some(Role::Officiant));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("guest"), None);
    }
}
