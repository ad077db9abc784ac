use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::util::format_ms_rfc3339;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AlumniCategory {
    Defense,
    CivilServices,
    Medical,
    Engineering,
    Business,
    Arts,
    Sports,
    Other,
}

impl AlumniCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defense => "defense",
            Self::CivilServices => "civil-services",
            Self::Medical => "medical",
            Self::Engineering => "engineering",
            Self::Business => "business",
            Self::Arts => "arts",
            Self::Sports => "sports",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AlumniCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlumniCategoryParseError;

impl FromStr for AlumniCategory {
    type Err = AlumniCategoryParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "defense" => Ok(Self::Defense),
            "civil-services" => Ok(Self::CivilServices),
            "medical" => Ok(Self::Medical),
            "engineering" => Ok(Self::Engineering),
            "business" => Ok(Self::Business),
            "arts" => Ok(Self::Arts),
            "sports" => Ok(Self::Sports),
            "other" => Ok(Self::Other),
            _ => Err(AlumniCategoryParseError),
        }
    }
}

/// Who decided and when. Reused for approvals and rejections: a rejection is
/// also a reviewed decision (spec I2).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewDecision {
    pub decided_by: String,
    pub decided_at_ms: i64,
}

/// The registration lifecycle as one tagged value. An `Approved` or
/// `Rejected` record carries a non-optional verification timestamp and
/// decision by construction, so a decision on an unverified record cannot
/// even be represented.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Lifecycle {
    Unverified {
        verification_token: String,
    },
    PendingApproval {
        verified_at_ms: i64,
    },
    Approved {
        verified_at_ms: i64,
        decision: ReviewDecision,
    },
    Rejected {
        verified_at_ms: i64,
        decision: ReviewDecision,
        reason: String,
    },
}

/// The three-way moderation outcome an administrator sees; `Unverified` and
/// `PendingApproval` both read as `Pending`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlumniRecord {
    pub alumni_id: String,
    pub slug: String,
    pub name: String,
    pub batch_year: i32,
    pub class_section: Option<String>,
    pub house: Option<String>,
    /// Not unique: siblings may register under one guardian address.
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub photo_path: Option<String>,
    pub designation: Option<String>,
    pub organization: Option<String>,
    pub category: AlumniCategory,
    pub linkedin_url: Option<String>,
    pub achievements: Option<String>,
    pub story: Option<String>,
    pub memories: Option<String>,
    pub message: Option<String>,
    /// Editorial highlight, orthogonal to approval.
    pub is_featured: bool,
    /// Directory visibility toggle, independent of approval.
    pub is_active: bool,
    pub lifecycle: Lifecycle,
    pub created_at_ms: i64,
}

impl AlumniRecord {
    pub fn approval_status(&self) -> ApprovalStatus {
        match self.lifecycle {
            Lifecycle::Unverified { .. } | Lifecycle::PendingApproval { .. } => {
                ApprovalStatus::Pending
            }
            Lifecycle::Approved { .. } => ApprovalStatus::Approved,
            Lifecycle::Rejected { .. } => ApprovalStatus::Rejected,
        }
    }

    pub fn email_verified_at_ms(&self) -> Option<i64> {
        match &self.lifecycle {
            Lifecycle::Unverified { .. } => None,
            Lifecycle::PendingApproval { verified_at_ms }
            | Lifecycle::Approved { verified_at_ms, .. }
            | Lifecycle::Rejected { verified_at_ms, .. } => Some(*verified_at_ms),
        }
    }

    pub fn is_email_verified(&self) -> bool {
        self.email_verified_at_ms().is_some()
    }

    pub fn verification_token(&self) -> Option<&str> {
        match &self.lifecycle {
            Lifecycle::Unverified { verification_token } => Some(verification_token),
            _ => None,
        }
    }

    pub fn decision(&self) -> Option<&ReviewDecision> {
        match &self.lifecycle {
            Lifecycle::Approved { decision, .. } | Lifecycle::Rejected { decision, .. } => {
                Some(decision)
            }
            _ => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match &self.lifecycle {
            Lifecycle::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn is_publicly_visible(&self) -> bool {
        self.is_active && matches!(self.lifecycle, Lifecycle::Approved { .. })
    }

    pub fn to_public_profile(&self) -> PublicAlumniProfile {
        PublicAlumniProfile {
            slug: self.slug.clone(),
            name: self.name.clone(),
            batch_year: self.batch_year,
            class_section: self.class_section.clone(),
            house: self.house.clone(),
            location: self.location.clone(),
            photo_path: self.photo_path.clone(),
            designation: self.designation.clone(),
            organization: self.organization.clone(),
            category: self.category,
            linkedin_url: self.linkedin_url.clone(),
            achievements: self.achievements.clone(),
            story: self.story.clone(),
            memories: self.memories.clone(),
            message: self.message.clone(),
            is_featured: self.is_featured,
        }
    }

    pub fn to_admin_view(&self) -> AdminAlumniView {
        let decision = self.decision();
        AdminAlumniView {
            alumni_id: self.alumni_id.clone(),
            slug: self.slug.clone(),
            name: self.name.clone(),
            batch_year: self.batch_year,
            class_section: self.class_section.clone(),
            house: self.house.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
            photo_path: self.photo_path.clone(),
            designation: self.designation.clone(),
            organization: self.organization.clone(),
            category: self.category,
            linkedin_url: self.linkedin_url.clone(),
            achievements: self.achievements.clone(),
            story: self.story.clone(),
            memories: self.memories.clone(),
            message: self.message.clone(),
            is_featured: self.is_featured,
            is_active: self.is_active,
            approval_status: self.approval_status(),
            email_verified: self.is_email_verified(),
            email_verified_at: self.email_verified_at_ms().map(format_ms_rfc3339),
            approved_by: decision.map(|d| d.decided_by.clone()),
            approved_at: decision.map(|d| format_ms_rfc3339(d.decided_at_ms)),
            rejection_reason: self.rejection_reason().map(|r| r.to_string()),
            created_at: format_ms_rfc3339(self.created_at_ms),
        }
    }
}

/// Public directory projection. No contact details, no moderation or audit
/// fields, no rejection reason.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PublicAlumniProfile {
    pub slug: String,
    pub name: String,
    pub batch_year: i32,
    pub class_section: Option<String>,
    pub house: Option<String>,
    pub location: Option<String>,
    pub photo_path: Option<String>,
    pub designation: Option<String>,
    pub organization: Option<String>,
    pub category: AlumniCategory,
    pub linkedin_url: Option<String>,
    pub achievements: Option<String>,
    pub story: Option<String>,
    pub memories: Option<String>,
    pub message: Option<String>,
    pub is_featured: bool,
}

/// Back-office projection with the moderation columns flattened out of the
/// lifecycle enum for the listing screen.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdminAlumniView {
    pub alumni_id: String,
    pub slug: String,
    pub name: String,
    pub batch_year: i32,
    pub class_section: Option<String>,
    pub house: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub photo_path: Option<String>,
    pub designation: Option<String>,
    pub organization: Option<String>,
    pub category: AlumniCategory,
    pub linkedin_url: Option<String>,
    pub achievements: Option<String>,
    pub story: Option<String>,
    pub memories: Option<String>,
    pub message: Option<String>,
    pub is_featured: bool,
    pub is_active: bool,
    pub approval_status: ApprovalStatus,
    pub email_verified: bool,
    pub email_verified_at: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lifecycle: Lifecycle) -> AlumniRecord {
        AlumniRecord {
            alumni_id: "a1".to_string(),
            slug: "amit-sharma".to_string(),
            name: "Amit Sharma".to_string(),
            batch_year: 2004,
            class_section: None,
            house: None,
            email: "amit@example.com".to_string(),
            phone: None,
            location: None,
            photo_path: None,
            designation: None,
            organization: None,
            category: AlumniCategory::Engineering,
            linkedin_url: None,
            achievements: None,
            story: None,
            memories: None,
            message: None,
            is_featured: false,
            is_active: true,
            lifecycle,
            created_at_ms: 1_000,
        }
    }

    #[test]
    fn unverified_and_pending_read_as_pending_status() {
        let unverified = record(Lifecycle::Unverified {
            verification_token: "tok".to_string(),
        });
        let pending = record(Lifecycle::PendingApproval { verified_at_ms: 5 });
        assert_eq!(unverified.approval_status(), ApprovalStatus::Pending);
        assert_eq!(pending.approval_status(), ApprovalStatus::Pending);
        assert!(!unverified.is_email_verified());
        assert!(pending.is_email_verified());
    }

    #[test]
    fn approved_record_always_carries_decision_fields() {
        let approved = record(Lifecycle::Approved {
            verified_at_ms: 5,
            decision: ReviewDecision {
                decided_by: "admin-1".to_string(),
                decided_at_ms: 9,
            },
        });
        let view = approved.to_admin_view();
        assert_eq!(view.approval_status, ApprovalStatus::Approved);
        assert_eq!(view.approved_by.as_deref(), Some("admin-1"));
        assert!(view.approved_at.is_some());
        assert!(view.rejection_reason.is_none());
    }

    #[test]
    fn public_visibility_requires_approved_and_active() {
        let mut approved = record(Lifecycle::Approved {
            verified_at_ms: 5,
            decision: ReviewDecision {
                decided_by: "admin-1".to_string(),
                decided_at_ms: 9,
            },
        });
        assert!(approved.is_publicly_visible());
        approved.is_active = false;
        assert!(!approved.is_publicly_visible());

        let pending = record(Lifecycle::PendingApproval { verified_at_ms: 5 });
        assert!(!pending.is_publicly_visible());
    }

    #[test]
    fn category_round_trips_through_kebab_case() {
        assert_eq!(
            "civil-services".parse::<AlumniCategory>(),
            Ok(AlumniCategory::CivilServices)
        );
        assert_eq!(AlumniCategory::CivilServices.to_string(), "civil-services");
        assert!("cooking".parse::<AlumniCategory>().is_err());
    }
}
