use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::moderation_statuses::ModerationStatus;

/// Report count from which a listing shows up in the moderation queue.
pub const FLAG_FOR_REVIEW_THRESHOLD: i32 = 4;

/// Report count at which a listing is suspended without moderator input.
pub const AUTO_SUSPEND_THRESHOLD: i32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTally {
    pub reports_count: i32,
    pub moderation_status: ModerationStatus,
    pub flagged_for_review: bool,
}

/// Outcome of recording one report against a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSubmission {
    Recorded(ReportTally),
    Duplicate,
    ServiceNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanOutcome {
    Banned { suspended_services: usize },
    AlreadyBanned,
}

/// Applies one more report to a listing's current count and status.
///
/// The flag at `FLAG_FOR_REVIEW_THRESHOLD` is advisory only: the stored status
/// is left as is until `AUTO_SUSPEND_THRESHOLD` is reached.
pub fn apply_report(current_count: i32, current_status: ModerationStatus) -> ReportTally {
    let reports_count = current_count.max(0).saturating_add(1);

    let moderation_status = if reports_count >= AUTO_SUSPEND_THRESHOLD {
        ModerationStatus::Suspended
    } else {
        current_status
    };

    ReportTally {
        reports_count,
        moderation_status,
        flagged_for_review: is_flagged_for_review(reports_count),
    }
}

pub fn is_flagged_for_review(reports_count: i32) -> bool {
    reports_count >= FLAG_FOR_REVIEW_THRESHOLD
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueClassification {
    Flagged,
    Suspended,
}

/// Derived queue state. This is never written back to `moderation_status`.
pub fn classify_for_queue(
    reports_count: i32,
    moderation_status: ModerationStatus,
) -> Option<QueueClassification> {
    if moderation_status == ModerationStatus::Suspended || reports_count >= AUTO_SUSPEND_THRESHOLD
    {
        Some(QueueClassification::Suspended)
    } else if is_flagged_for_review(reports_count) {
        Some(QueueClassification::Flagged)
    } else {
        None
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportModel {
    pub service_id: Option<Uuid>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmissionDto {
    pub success: bool,
    pub reports_count: i32,
    pub moderation_status: ModerationStatus,
    pub flagged_for_review: bool,
}

impl From<ReportTally> for ReportSubmissionDto {
    fn from(value: ReportTally) -> Self {
        Self {
            success: true,
            reports_count: value.reports_count,
            moderation_status: value.moderation_status,
            flagged_for_review: value.flagged_for_review,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratorActionModel {
    pub action: Option<String>,
    pub service_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub ban_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeratorCommand {
    Approve { service_id: Uuid },
    Suspend { service_id: Uuid },
    Delete { service_id: Uuid },
    BanOwner { owner_id: Uuid, reason: Option<String> },
}

impl ModeratorCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ModeratorCommand::Approve { .. } => "approve",
            ModeratorCommand::Suspend { .. } => "suspend",
            ModeratorCommand::Delete { .. } => "delete",
            ModeratorCommand::BanOwner { .. } => "ban_owner",
        }
    }
}

impl TryFrom<ModeratorActionModel> for ModeratorCommand {
    type Error = String;

    fn try_from(value: ModeratorActionModel) -> Result<Self, Self::Error> {
        let action = value
            .action
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| "action is required".to_string())?;

        let service_id = || {
            value
                .service_id
                .ok_or_else(|| format!("serviceId is required for {}", action))
        };

        match action {
            "approve" => Ok(ModeratorCommand::Approve {
                service_id: service_id()?,
            }),
            "suspend" => Ok(ModeratorCommand::Suspend {
                service_id: service_id()?,
            }),
            "delete" => Ok(ModeratorCommand::Delete {
                service_id: service_id()?,
            }),
            "ban_owner" => {
                let owner_id = value
                    .owner_id
                    .ok_or_else(|| "ownerId is required for ban_owner".to_string())?;
                let reason = value
                    .ban_reason
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());
                Ok(ModeratorCommand::BanOwner { owner_id, reason })
            }
            other => Err(format!("Unsupported action: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModeratorActionDto {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationQueueItemDto {
    pub service_id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub reports_count: i32,
    pub moderation_status: ModerationStatus,
    pub classification: QueueClassification,
}
