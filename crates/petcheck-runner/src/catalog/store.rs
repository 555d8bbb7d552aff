//! Store scenarios: `/store/order`, `/store/order/{id}`, `/store/inventory`

use serde_json::json;

use petcheck_core::{Order, OrderStatus, SchemaKind, Suite};

use super::{TestCase, expect_json, send, to_json};
use crate::checks::{
    JsonType, compare_fields, expect_body_type, expect_field, expect_non_negative_int,
    expect_status, expect_text, validate_schema,
};
use crate::context::{CaseContext, CaseError, Cleanup, all_hold};
use crate::fixture::OrderFixture;

const ORDER_NOT_FOUND: &str = "Order not found";

/// Inventory keys that must always be reported
const INVENTORY_KEYS: [&str; 2] = ["approved", "delivered"];

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new(
            Suite::Store,
            "post_placing_order",
            "Place an order",
            post_placing_order,
        ),
        TestCase::new(
            Suite::Store,
            "get_order_by_id",
            "Get order by id",
            get_order_by_id,
        ),
        TestCase::new(
            Suite::Store,
            "delete_order_by_id",
            "Delete order by id",
            delete_order_by_id,
        ),
        TestCase::new(
            Suite::Store,
            "get_information_nonexistent_order",
            "Get information about a nonexistent order",
            get_information_nonexistent_order,
        ),
        TestCase::new(
            Suite::Store,
            "get_store_inventory",
            "Get store inventory",
            get_store_inventory,
        ),
    ]
}

fn post_placing_order(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let payload = ctx.step("Prepare order payload", |ctx| {
        let ids = ctx.ids();
        Ok(Order {
            id: ids.next_id(1),
            pet_id: ids.next_id(1),
            quantity: 1,
            status: OrderStatus::Placed,
            complete: true,
        })
    })?;

    let resp = send(ctx, "Send place order request", |c| c.place_order(&payload))?;

    let body = ctx.step("Check response status and JSON schema", |ctx| {
        let body = expect_json(&resp, 200)?;
        ctx.register(Cleanup::Order(payload.id));
        validate_schema(&body, SchemaKind::Order).map_err(|f| resp.attach(f))?;
        Ok(body)
    })?;

    ctx.step("Check order fields in response", |_| {
        let mismatches = compare_fields(
            &to_json(&payload)?,
            &body,
            &["/id", "/petId", "/quantity", "/status", "/complete"],
        );
        all_hold(mismatches.into_iter().map(|f| resp.attach(f)).collect())
    })
}

fn get_order_by_id(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let order = OrderFixture::create(ctx)?;
    let id = ctx.step("Get created order id", |_| Ok(order.id))?;

    let resp = send(ctx, "Send get order by id request", |c| c.get_order(id))?;

    let body = ctx.step("Check response status and order data", |_| {
        let body = expect_json(&resp, 200)?;
        expect_field(&body, "/id", &json!(id)).map_err(|f| resp.attach(f))?;
        Ok(body)
    })?;

    ctx.step("Check order matches the placed one", |_| {
        let mismatches = compare_fields(&order.body, &body, &["/petId", "/quantity", "/status"]);
        all_hold(mismatches.into_iter().map(|f| resp.attach(f)).collect())
    })
}

fn delete_order_by_id(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let order = OrderFixture::create(ctx)?;
    let id = ctx.step("Get created order id", |_| Ok(order.id))?;

    let deleted = send(ctx, "Send delete order request", |c| c.delete_order(id))?;
    ctx.step("Check deletion succeeded", |_| Ok(expect_status(&deleted, 200)?))?;

    let resp = send(ctx, "Send get order by id request", |c| c.get_order(id))?;
    ctx.step("Check response status", |_| Ok(expect_status(&resp, 404)?))?;

    ctx.step("Check order is gone", |ctx| {
        let again = ctx.client().get_order(id)?;
        Ok(expect_status(&again, 404)?)
    })
}

fn get_information_nonexistent_order(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let id = ctx.config().missing_order_id;
    let resp = send(ctx, "Send get request for nonexistent order", |c| c.get_order(id))?;

    ctx.step("Check response status", |_| Ok(expect_status(&resp, 404)?))?;
    ctx.step("Check response text", |_| Ok(expect_text(&resp, ORDER_NOT_FOUND)?))
}

fn get_store_inventory(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let resp = send(ctx, "Send get inventory request", |c| c.get_inventory())?;

    ctx.step("Check response status", |_| Ok(expect_status(&resp, 200)?))?;

    let body = ctx.step("Check inventory format", |_| {
        let body = resp.json()?;
        expect_body_type(&body, JsonType::Object).map_err(|f| resp.attach(f))?;
        validate_schema(&body, SchemaKind::Inventory).map_err(|f| resp.attach(f))?;
        Ok(body)
    })?;

    ctx.step("Check counts are non-negative integers", |_| {
        all_hold(check_inventory(&body))
    })
}

/// Counts vary with server state, so only presence, type and sign are checked.
fn check_inventory(body: &serde_json::Value) -> Vec<petcheck_core::Failure> {
    INVENTORY_KEYS
        .iter()
        .filter_map(|key| expect_non_negative_int(body, key).err())
        .collect()
}
