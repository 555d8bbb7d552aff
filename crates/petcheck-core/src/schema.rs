//! Schema registry: JSON-schema documents for response bodies
//!
//! Documents describe structure only (required fields, primitive/object/array
//! types). Literal values are checked separately by the runner.

use std::sync::LazyLock;

static PET: LazyLock<serde_json::Value> =
    LazyLock::new(|| parse(include_str!("../schemas/pet.schema.json")));
static ORDER: LazyLock<serde_json::Value> =
    LazyLock::new(|| parse(include_str!("../schemas/order.schema.json")));
static INVENTORY: LazyLock<serde_json::Value> =
    LazyLock::new(|| parse(include_str!("../schemas/inventory.schema.json")));

fn parse(document: &str) -> serde_json::Value {
    serde_json::from_str(document).expect("bundled schema documents are valid JSON")
}

/// Resource shapes with a registered schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Pet,
    Order,
    Inventory,
}

impl SchemaKind {
    pub const ALL: [Self; 3] = [Self::Pet, Self::Order, Self::Inventory];

    /// The schema document for this resource.
    #[must_use]
    pub fn document(self) -> &'static serde_json::Value {
        match self {
            Self::Pet => &PET,
            Self::Order => &ORDER,
            Self::Inventory => &INVENTORY,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pet => "Pet",
            Self::Order => "Order",
            Self::Inventory => "Inventory",
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
