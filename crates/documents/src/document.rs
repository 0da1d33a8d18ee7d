use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use condohub_core::{DomainResult, EnterpriseId, Entity, Record, UserId, text};

condohub_core::record_id!(
    /// Document identifier.
    DocumentId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub enterprise_id: EnterpriseId,
    pub title: String,
    pub category: Option<String>,
    pub file_name: String,
    pub file_url: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub description: Option<String>,
    pub expires_on: Option<NaiveDate>,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Derived from the last segment of `file_url` when omitted.
    #[serde(default)]
    pub file_name: Option<String>,
    pub file_url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "condohub_core::patch::nullable")]
    pub expires_on: Option<Option<NaiveDate>>,
}

fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("document")
        .to_string()
}

impl Document {
    pub fn create(
        enterprise_id: EnterpriseId,
        uploaded_by: UserId,
        input: NewDocument,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = text::required("title", &input.title)?;
        let file_url = text::required("file url", &input.file_url)?;
        let file_name = text::optional(input.file_name).unwrap_or_else(|| file_name_from_url(&file_url));

        Ok(Self {
            id: DocumentId::new(),
            enterprise_id,
            title,
            category: text::optional(input.category),
            file_name,
            file_url,
            mime_type: text::optional(input.mime_type),
            size_bytes: input.size_bytes,
            description: text::optional(input.description),
            expires_on: input.expires_on,
            uploaded_by,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: DocumentPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let title = patch.title.as_deref().map(|t| text::required("title", t)).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(v) = patch.category {
            self.category = text::optional(v);
        }
        if let Some(v) = patch.description {
            self.description = text::optional(v);
        }
        if let Some(v) = patch.expires_on {
            self.expires_on = v;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Days until expiry (negative once expired); `None` if it never expires.
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expires_on.map(|d| (d - today).num_days())
    }
}

impl Entity for Document {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Record for Document {
    const TABLE: &'static str = "documents";

    fn key(&self) -> uuid::Uuid {
        *self.id.as_uuid()
    }

    fn enterprise_id(&self) -> Option<EnterpriseId> {
        Some(self.enterprise_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentFilter {
    pub category: Option<String>,
    /// Matches title, file name and description.
    pub search: Option<String>,
}

impl DocumentFilter {
    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            let same = doc
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !same {
                return false;
            }
        }
        let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return true;
        };
        text::contains_ci(&doc.title, q)
            || text::contains_ci(&doc.file_name, q)
            || doc.description.as_deref().is_some_and(|d| text::contains_ci(d, q))
    }
}

pub fn sort_newest_first(docs: &mut [Document]) {
    docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Documents expiring on or before `today + days`, already expired included,
/// soonest first.
pub fn expiring_within(docs: &[Document], today: NaiveDate, days: u32) -> Vec<&Document> {
    let horizon = today
        .checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(NaiveDate::MAX);
    let mut out: Vec<&Document> = docs
        .iter()
        .filter(|d| d.expires_on.is_some_and(|e| e <= horizon))
        .collect();
    out.sort_by_key(|d| d.expires_on);
    out
}
