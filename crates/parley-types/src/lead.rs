//! User and lead identity types.
//!
//! Users are created externally (registration flow, out of scope) and
//! are immutable from this core's perspective. Leads are prospective
//! user records created through the bulk insert endpoint, which accepts
//! either a single object or an array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored lead record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lead fields supplied by the caller; ID and timestamp are assigned
/// at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Request body for bulk lead creation: a single lead or an array.
///
/// Both shapes normalize to a `Vec<NewLead>` via [`LeadBatch::into_vec`];
/// a single object and a one-element array produce identical stored rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LeadBatch {
    One(NewLead),
    Many(Vec<NewLead>),
}

impl LeadBatch {
    /// Flatten into a vector. May be empty (callers must reject that).
    pub fn into_vec(self) -> Vec<NewLead> {
        match self {
            LeadBatch::One(lead) => vec![lead],
            LeadBatch::Many(leads) => leads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_batch_accepts_single_object() {
        let batch: LeadBatch =
            serde_json::from_str(r#"{"full_name":"Ada Lovelace"}"#).unwrap();
        let leads = batch.into_vec();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].full_name, "Ada Lovelace");
    }

    #[test]
    fn lead_batch_accepts_array() {
        let batch: LeadBatch = serde_json::from_str(
            r#"[{"full_name":"Ada"},{"full_name":"Grace","email":"g@example.com"}]"#,
        )
        .unwrap();
        let leads = batch.into_vec();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[1].email.as_deref(), Some("g@example.com"));
    }

    #[test]
    fn lead_batch_single_and_one_element_array_match() {
        let single: LeadBatch =
            serde_json::from_str(r#"{"full_name":"Ada"}"#).unwrap();
        let array: LeadBatch =
            serde_json::from_str(r#"[{"full_name":"Ada"}]"#).unwrap();
        let a = single.into_vec();
        let b = array.into_vec();
        assert_eq!(a.len(), b.len());
        assert_eq!(a[0].full_name, b[0].full_name);
    }

    #[test]
    fn lead_batch_empty_array_flattens_to_empty() {
        let batch: LeadBatch = serde_json::from_str("[]").unwrap();
        assert!(batch.into_vec().is_empty());
    }
}
