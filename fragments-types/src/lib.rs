//! Shared types for the fragments service: domain records, tag handling,
//! the search composer and the JSON status envelope.

pub mod search;
pub mod tags;

pub use search::{Criterion, DateFilter, SearchError, SearchParams, SearchQuery, TagMatch};
pub use tags::{normalize_tags, parse_tags};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of fragments shown on one listing page.
pub const FRAGMENTS_PER_PAGE: u32 = 5;

// =====================================================
// Domain Types
// =====================================================

/// A registered account. Created at registration, never updated in-app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
    /// Salted password hash, see the service's `password` module.
    #[serde(skip_serializing, default)]
    pub password: String,
    pub register_date: NaiveDate,
}

/// Fields needed to insert a user. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// A tagged, dated text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: i64,
    pub title: String,
    pub text: String,
    /// Normalized tags in the order they were entered.
    pub tags: Vec<String>,
    pub date: NaiveDate,
}

impl Fragment {
    /// Tags joined the way the edit form expects them back.
    pub fn tags_display(&self) -> String {
        self.tags.join(", ")
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The editable part of a fragment, as submitted by the add and edit forms.
#[derive(Debug, Clone)]
pub struct FragmentDraft {
    pub title: String,
    pub text: String,
    /// Raw comma separated tag input; normalized on every save.
    pub tags: String,
    pub date: NaiveDate,
}

impl FragmentDraft {
    pub fn normalized_tags(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }
}

/// One page of the newest-first fragment listing.
#[derive(Debug, Clone, Serialize)]
pub struct FragmentPage {
    pub items: Vec<Fragment>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl FragmentPage {
    pub fn total_pages(&self) -> u32 {
        let per_page = i64::from(self.per_page.max(1));
        ((self.total + per_page - 1) / per_page) as u32
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

// =====================================================
// Status Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> RpcResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub total_users: i64,
    pub total_fragments: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u32, total: i64) -> FragmentPage {
        FragmentPage {
            items: Vec::new(),
            page,
            per_page: FRAGMENTS_PER_PAGE,
            total,
        }
    }

    #[test]
    fn test_page_counts() {
        assert_eq!(page(1, 0).total_pages(), 0);
        assert_eq!(page(1, 5).total_pages(), 1);
        assert_eq!(page(1, 6).total_pages(), 2);
    }

    #[test]
    fn test_page_navigation() {
        let first = page(1, 11);
        assert!(!first.has_prev());
        assert!(first.has_next());

        let last = page(3, 11);
        assert!(last.has_prev());
        assert!(!last.has_next());
    }

    #[test]
    fn test_user_password_not_serialized() {
        let user = User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada_l".to_string(),
            password: "pbkdf2-sha256$1$00$00".to_string(),
            register_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("pbkdf2"));
        assert!(json.contains("\"register_date\":\"2024-01-02\""));
    }

    #[test]
    fn test_rpc_response_err_omits_data() {
        let resp: RpcResponse<ServiceStatus> = RpcResponse::err("down");
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"down"}"#);
    }
}
