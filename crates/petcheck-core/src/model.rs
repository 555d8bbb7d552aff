//! Pet Store resources as exchanged over HTTP
//!
//! Payloads are built from these types and serialized with serde; responses
//! are kept as raw `serde_json::Value` so checks can report on exactly what
//! the server sent.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Pet sale status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    Available,
    Pending,
    Sold,
}

impl PetStatus {
    pub const ALL: [Self; 3] = [Self::Available, Self::Pending, Self::Sold];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
        }
    }
}

impl std::fmt::Display for PetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A pet. Optional parts are omitted from the payload when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PetStatus>,
}

impl Pet {
    /// Minimal pet: id, name and status only.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, status: PetStatus) -> Self {
        Self {
            id,
            name: name.into(),
            category: None,
            photo_urls: Vec::new(),
            tags: Vec::new(),
            status: Some(status),
        }
    }

    #[must_use]
    pub fn with_category(mut self, id: i64, name: impl Into<String>) -> Self {
        self.category = Some(Category {
            id,
            name: name.into(),
        });
        self
    }

    #[must_use]
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_urls.push(url.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, id: i64, name: impl Into<String>) -> Self {
        self.tags.push(Tag {
            id,
            name: name.into(),
        });
        self
    }
}

/// Order fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Approved,
    Delivered,
}

/// A store order. `pet_id` is not checked for existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub pet_id: i64,
    pub quantity: u32,
    pub status: OrderStatus,
    pub complete: bool,
}
