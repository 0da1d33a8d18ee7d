use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainResult, EnterpriseId, Entity, Record, text};

use crate::IssueId;

condohub_core::record_id!(
    /// Issue photo identifier.
    PhotoId
);

/// A photo attached to a structural issue, referenced by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuePhoto {
    pub id: PhotoId,
    pub enterprise_id: EnterpriseId,
    pub issue_id: IssueId,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl IssuePhoto {
    pub fn new(enterprise_id: EnterpriseId, issue_id: IssueId, url: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: PhotoId::new(),
            enterprise_id,
            issue_id,
            url: text::required("photo url", url)?,
            uploaded_at: now,
        })
    }
}

impl Entity for IssuePhoto {
    type Id = PhotoId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for IssuePhoto {
    const TABLE: &'static str = "issue_photos";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_required() {
        assert!(IssuePhoto::new(EnterpriseId::new(), IssueId::new(), "  ", Utc::now()).is_err());
        let p = IssuePhoto::new(EnterpriseId::new(), IssueId::new(), " https://cdn/x.jpg ", Utc::now()).unwrap();
        assert_eq!(p.url, "https://cdn/x.jpg");
    }
}
