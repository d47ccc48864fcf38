//! Versioned project deliverables and their review state machine
//!
//! ```text
//! pending --submit--> submitted --approve--> approved
//!                        |  ^
//!          request_revision  submit
//!                        v  |
//!                  revision_requested
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableStatus {
    /// Created, nothing handed in yet
    Pending,
    /// Handed in by the vendor and waiting for the client
    Submitted,
    /// Accepted by the client
    Approved,
    /// Sent back to the vendor with a comment
    RevisionRequested,
}

impl DeliverableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliverableStatus::Pending => "pending",
            DeliverableStatus::Submitted => "submitted",
            DeliverableStatus::Approved => "approved",
            DeliverableStatus::RevisionRequested => "revision_requested",
        }
    }

    /// Whether the client may approve or request a revision
    pub fn can_review(&self) -> bool {
        matches!(self, DeliverableStatus::Submitted)
    }

    /// Whether the vendor may hand the deliverable in
    pub fn can_submit(&self) -> bool {
        matches!(
            self,
            DeliverableStatus::Pending | DeliverableStatus::RevisionRequested
        )
    }

    /// A review outcome has been recorded
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            DeliverableStatus::Approved | DeliverableStatus::RevisionRequested
        )
    }
}

impl std::str::FromStr for DeliverableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DeliverableStatus::Pending),
            "submitted" => Ok(DeliverableStatus::Submitted),
            "approved" => Ok(DeliverableStatus::Approved),
            "revision_requested" => Ok(DeliverableStatus::RevisionRequested),
            _ => Err(format!("Invalid deliverable status: {}", s)),
        }
    }
}

/// v1 initial, v2 revision, v3 final
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverableVersion {
    V1,
    V2,
    V3,
}

impl DeliverableVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliverableVersion::V1 => "v1",
            DeliverableVersion::V2 => "v2",
            DeliverableVersion::V3 => "v3",
        }
    }

    pub fn previous(&self) -> Option<DeliverableVersion> {
        match self {
            DeliverableVersion::V1 => None,
            DeliverableVersion::V2 => Some(DeliverableVersion::V1),
            DeliverableVersion::V3 => Some(DeliverableVersion::V2),
        }
    }
}

impl std::str::FromStr for DeliverableVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(DeliverableVersion::V1),
            "v2" => Ok(DeliverableVersion::V2),
            "v3" => Ok(DeliverableVersion::V3),
            _ => Err(format!("Invalid deliverable version: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableType {
    Loom,
    Json,
    Pdf,
    Other,
}

impl DeliverableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliverableType::Loom => "loom",
            DeliverableType::Json => "json",
            DeliverableType::Pdf => "pdf",
            DeliverableType::Other => "other",
        }
    }
}

impl std::str::FromStr for DeliverableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loom" => Ok(DeliverableType::Loom),
            "json" => Ok(DeliverableType::Json),
            "pdf" => Ok(DeliverableType::Pdf),
            "other" => Ok(DeliverableType::Other),
            _ => Err(format!("Invalid deliverable type: {}", s)),
        }
    }
}

/// Deliverable slot within a project, 1 through 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DeliverableNumber(u8);

impl DeliverableNumber {
    pub const MAX: u8 = 3;

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DeliverableNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=Self::MAX).contains(&value) {
            Ok(DeliverableNumber(value))
        } else {
            Err(format!(
                "Deliverable number must be between 1 and {}, got {}",
                Self::MAX,
                value
            ))
        }
    }
}

impl From<DeliverableNumber> for u8 {
    fn from(number: DeliverableNumber) -> Self {
        number.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDeliverable {
    pub id: Uuid,
    pub project_id: Uuid,
    pub deliverable_number: DeliverableNumber,
    pub version: DeliverableVersion,
    pub title: String,
    #[serde(rename = "type")]
    pub deliverable_type: DeliverableType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: DeliverableStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectDeliverable {
    /// A new deliverable; handing in a URL at creation counts as a submission
    pub fn new(
        project_id: Uuid,
        deliverable_number: DeliverableNumber,
        version: DeliverableVersion,
        title: impl Into<String>,
        deliverable_type: DeliverableType,
        url: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let status = if url.is_some() {
            DeliverableStatus::Submitted
        } else {
            DeliverableStatus::Pending
        };
        Self {
            id: Uuid::new_v4(),
            project_id,
            deliverable_number,
            version,
            title: title.into(),
            deliverable_type,
            url,
            status,
            client_comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Vendor hands the deliverable in, optionally replacing the URL
    pub fn submit(&mut self, url: Option<String>) -> Result<(), String> {
        if !self.status.can_submit() {
            return Err(format!(
                "Cannot submit deliverable with status: {}",
                self.status.as_str()
            ));
        }
        if let Some(url) = url {
            self.url = Some(url);
        }
        if self.url.is_none() {
            return Err("A URL is required to submit a deliverable".to_string());
        }
        self.status = DeliverableStatus::Submitted;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn approve(&mut self) -> Result<(), String> {
        if !self.status.can_review() {
            return Err(format!(
                "Cannot approve deliverable with status: {}",
                self.status.as_str()
            ));
        }
        self.status = DeliverableStatus::Approved;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Client sends the deliverable back; the comment must not be blank
    pub fn request_revision(&mut self, comment: impl Into<String>) -> Result<(), String> {
        if !self.status.can_review() {
            return Err(format!(
                "Cannot request revision for deliverable with status: {}",
                self.status.as_str()
            ));
        }
        let comment = comment.into();
        if comment.trim().is_empty() {
            return Err("A comment is required when requesting a revision".to_string());
        }
        self.status = DeliverableStatus::RevisionRequested;
        self.client_comment = Some(comment);
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Why a new deliverable version may not be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionRejection {
    /// This number/version already exists
    Duplicate,
    /// The previous version is missing or has not been reviewed
    PreviousUnresolved(DeliverableVersion),
}

impl std::fmt::Display for VersionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionRejection::Duplicate => write!(f, "Deliverable version already exists"),
            VersionRejection::PreviousUnresolved(previous) => write!(
                f,
                "Version {} must be approved or sent back for revision first",
                previous.as_str()
            ),
        }
    }
}

/// Check that `version` of deliverable `number` may be added to `existing`.
///
/// `existing` holds the deliverables already stored for the project.
pub fn check_new_version(
    existing: &[ProjectDeliverable],
    number: DeliverableNumber,
    version: DeliverableVersion,
) -> Result<(), VersionRejection> {
    let same_number = || existing.iter().filter(|d| d.deliverable_number == number);

    if same_number().any(|d| d.version == version) {
        return Err(VersionRejection::Duplicate);
    }

    if let Some(previous) = version.previous() {
        let resolved = same_number()
            .find(|d| d.version == previous)
            .map(|d| d.status.is_resolved())
            .unwrap_or(false);
        if !resolved {
            return Err(VersionRejection::PreviousUnresolved(previous));
        }
    }

    Ok(())
}
