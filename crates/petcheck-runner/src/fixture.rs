//! Fixture Provider: precondition entities for dependent cases
//!
//! A fixture creates its entity through the public API, hands the parsed
//! response body to the case, and registers the entity for optional teardown.
//! A non-200 creation aborts the dependent case with `FixtureFailed`.

use serde_json::Value;

use petcheck_core::{Order, OrderStatus, Pet, PetStatus};

use crate::client::ApiResponse;
use crate::context::{CaseContext, CaseError, Cleanup, fixture_failure};

/// Name of the pet every fixture creates
pub const FIXTURE_PET_NAME: &str = "Buddy";

/// A pet that exists on the server.
#[derive(Debug, Clone)]
pub struct PetFixture {
    pub id: i64,
    /// Body the server returned on creation
    pub body: Value,
}

impl PetFixture {
    /// Create a pet named "Buddy" with status `available`.
    ///
    /// # Errors
    ///
    /// Returns `CaseError::Fixture` if creation is not 200 or the echoed body
    /// has no integer `id`; `CaseError::Client` on transport or JSON errors.
    pub fn create(ctx: &mut CaseContext<'_>) -> Result<Self, CaseError> {
        ctx.step("Create pet fixture", |ctx| {
            let payload = Pet::new(ctx.ids().next_id(1), FIXTURE_PET_NAME, PetStatus::Available);
            let resp = ctx.client().add_pet(&payload)?;
            let (id, body) = created("pet", &resp)?;
            ctx.register(Cleanup::Pet(id));
            Ok(Self { id, body })
        })
    }
}

/// An order that exists on the server.
#[derive(Debug, Clone)]
pub struct OrderFixture {
    pub id: i64,
    pub body: Value,
}

impl OrderFixture {
    /// Place an order for one pet, status `placed`, complete.
    ///
    /// # Errors
    ///
    /// Same as [`PetFixture::create`].
    pub fn create(ctx: &mut CaseContext<'_>) -> Result<Self, CaseError> {
        ctx.step("Create order fixture", |ctx| {
            let ids = ctx.ids();
            let payload = Order {
                id: ids.next_id(1),
                pet_id: ids.next_id(1),
                quantity: 1,
                status: OrderStatus::Placed,
                complete: true,
            };
            let resp = ctx.client().place_order(&payload)?;
            let (id, body) = created("order", &resp)?;
            ctx.register(Cleanup::Order(id));
            Ok(Self { id, body })
        })
    }
}

/// Id and body of a creation response.
fn created(entity: &str, resp: &ApiResponse) -> Result<(i64, Value), CaseError> {
    if resp.status != 200 {
        return Err(CaseError::Fixture(Box::new(resp.attach(
            fixture_failure(format!("creating {entity} returned {}", resp.status))
                .with_expected("200")
                .with_actual(resp.status.to_string()),
        ))));
    }
    let body = resp.json()?;
    let id = body.get("id").and_then(Value::as_i64).ok_or_else(|| {
        CaseError::Fixture(Box::new(resp.attach(fixture_failure(format!(
            "created {entity} has no integer id"
        )))))
    })?;
    Ok((id, body))
}
