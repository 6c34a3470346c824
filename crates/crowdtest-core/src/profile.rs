//! Customer profile reference entities and the profile source contract.
//!
//! Profiles are read-only inputs supplied by an external catalog; the engine
//! never mutates them.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// One purchased item in a customer's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    #[serde(default)]
    pub item_id: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: String,
    pub price: f64,
    pub date: String,
    #[serde(default)]
    pub returned: bool,
    #[serde(default)]
    pub return_reason: Option<String>,
}

/// Browsing signals recorded for a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowsingBehavior {
    #[serde(default)]
    pub categories_viewed: Vec<String>,
    #[serde(default)]
    pub time_spent_minutes: f64,
    #[serde(default)]
    pub items_wishlisted: u32,
    #[serde(default)]
    pub collections_browsed: Vec<String>,
    #[serde(default)]
    pub search_queries: Vec<String>,
}

/// A review, complaint, support ticket, or survey answer in the customer's
/// own words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub date: String,
    /// 1-5 scale where applicable.
    #[serde(default)]
    pub rating: Option<u8>,
}

/// Declared tastes and shopping habits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerPreferences {
    /// Source data sometimes carries a bare string here instead of a list.
    #[serde(default, deserialize_with = "string_or_list")]
    pub style: Vec<String>,
    #[serde(default)]
    pub favorite_colors: Vec<String>,
    #[serde(default = "default_price_sensitivity")]
    pub price_sensitivity: String,
    #[serde(default)]
    pub brand_affinity: Vec<String>,
    #[serde(default)]
    pub avoids: Vec<String>,
    #[serde(default)]
    pub preferred_fit: String,
    #[serde(default)]
    pub sustainability_interest: bool,
    #[serde(default)]
    pub sale_shopper: bool,
}

impl Default for CustomerPreferences {
    fn default() -> Self {
        Self {
            style: Vec::new(),
            favorite_colors: Vec::new(),
            price_sensitivity: default_price_sensitivity(),
            brand_affinity: Vec::new(),
            avoids: Vec::new(),
            preferred_fit: String::new(),
            sustainability_interest: false,
            sale_shopper: false,
        }
    }
}

fn default_price_sensitivity() -> String {
    "medium".to_string()
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(value) => vec![value],
        StringOrList::Many(values) => values,
    })
}

/// A synthetic customer, the unit a panel is built from.
///
/// `segments` is the set of labels the customer belongs to; a response is
/// attributed to exactly one of them (see the collector's selection rule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub location: String,
    #[serde(default)]
    pub purchase_history: Vec<PurchaseItem>,
    #[serde(default)]
    pub browsing_behavior: BrowsingBehavior,
    #[serde(default)]
    pub feedback_history: Vec<FeedbackItem>,
    #[serde(default)]
    pub preferences: CustomerPreferences,
    #[serde(default)]
    pub segments: Vec<String>,
    #[serde(default)]
    pub member_since: String,
    #[serde(default)]
    pub loyalty_tier: String,
}

/// Errors surfaced by a profile catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileSourceError {
    #[error("profile source io error: {0}")]
    Io(String),
    #[error("invalid profile data: {0}")]
    Invalid(String),
}

/// Read-only catalog supplying the profiles a test run is seeded from.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn list_profiles(&self) -> Result<Vec<CustomerProfile>, ProfileSourceError>;
}
