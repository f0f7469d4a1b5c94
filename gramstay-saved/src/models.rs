use chrono::{DateTime, Utc};
use gramstay_core::{validation, CoreError, CoreResult, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

/// Kinds of entity a traveller can save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Listing,
    Experience,
    Plan,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Listing => write!(f, "listing"),
            ItemKind::Experience => write!(f, "experience"),
            ItemKind::Plan => write!(f, "plan"),
        }
    }
}

/// A trip plan saved together with the details needed to show it offline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetail {
    #[validate(length(min = 1, message = "plan id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "plan title is required"))]
    pub title: String,
    #[serde(default)]
    pub destination: String,
    #[validate(range(min = 1, message = "a plan spans at least one day"))]
    pub days: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPlan {
    #[validate(length(min = 1, message = "plan id is required"))]
    pub id: String,
    #[validate(length(min = 1, message = "plan title is required"))]
    pub title: String,
    pub destination: String,
    #[validate(range(min = 1, message = "a plan spans at least one day"))]
    pub days: u32,
    pub notes: Option<String>,
}

/// Persisted form of the saved-items sets.
///
/// Sets serialize as sorted arrays; `planDetails` is optional on read so
/// blobs written without plan details still hydrate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedItemsSnapshot {
    pub listings: Vec<String>,
    pub experiences: Vec<String>,
    pub plans: Vec<String>,
    #[serde(default)]
    pub plan_details: BTreeMap<String, PlanDetail>,
}

impl Snapshot for SavedItemsSnapshot {
    fn check(&self) -> CoreResult<()> {
        let ids = self
            .listings
            .iter()
            .chain(&self.experiences)
            .chain(&self.plans);
        for id in ids {
            validation::require_non_blank("id", id)?;
        }

        for (id, detail) in &self.plan_details {
            if detail.id != *id || !self.plans.contains(id) {
                return Err(CoreError::ValidationError(format!(
                    "plan detail {} has no matching saved plan",
                    id
                )));
            }
            validation::check(detail)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_wire_shape() {
        let snapshot: SavedItemsSnapshot = serde_json::from_str(
            r#"{"listings":["manali-valley"],"experiences":[],"plans":["kutch-rann"]}"#,
        )
        .unwrap();

        assert!(snapshot.check().is_ok());
        assert!(snapshot.plan_details.is_empty());
        assert_eq!(snapshot.plans, vec!["kutch-rann".to_string()]);
    }

    #[test]
    fn test_orphan_plan_detail_is_rejected() {
        let snapshot: SavedItemsSnapshot = serde_json::from_str(
            r#"{"listings":[],"experiences":[],"plans":[],
                "planDetails":{"kutch-rann":{"id":"kutch-rann","title":"Rann Utsav","days":3,"savedAt":"2024-01-05T10:00:00Z"}}}"#,
        )
        .unwrap();

        assert!(snapshot.check().is_err());
    }

    #[test]
    fn test_blank_id_is_rejected() {
        let snapshot = SavedItemsSnapshot {
            listings: vec![" ".to_string()],
            ..SavedItemsSnapshot::default()
        };
        assert!(snapshot.check().is_err());
    }
}
