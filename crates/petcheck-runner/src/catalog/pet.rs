//! Pet scenarios: `/pet`, `/pet/{id}`, `/pet/findByStatus`

use serde_json::json;

use petcheck_core::{Pet, PetStatus, SchemaKind, Suite};

use super::{TestCase, expect_json, send, to_json};
use crate::checks::{
    JsonType, compare_fields, expect_body_type, expect_field, expect_status, expect_text,
    validate_schema,
};
use crate::context::{CaseContext, CaseError, Cleanup, all_hold};
use crate::fixture::PetFixture;

const PET_NOT_FOUND: &str = "Pet not found";
const PET_DELETED: &str = "Pet deleted";

/// Status query values and whether the server should accept them
const STATUS_VARIANTS: [(&str, u16, JsonType); 5] = [
    ("available", 200, JsonType::List),
    ("pending", 200, JsonType::List),
    ("sold", 200, JsonType::List),
    ("unavailable", 400, JsonType::Object),
    ("", 400, JsonType::Object),
];

pub fn cases() -> Vec<TestCase> {
    let mut cases = vec![
        TestCase::new(
            Suite::Pet,
            "delete_nonexistent_pet",
            "Delete a nonexistent pet",
            delete_nonexistent_pet,
        ),
        TestCase::new(
            Suite::Pet,
            "update_nonexistent_pet",
            "Update a nonexistent pet",
            update_nonexistent_pet,
        ),
        TestCase::new(
            Suite::Pet,
            "get_information_nonexistent_pet",
            "Get information about a nonexistent pet",
            get_information_nonexistent_pet,
        ),
        TestCase::new(Suite::Pet, "add_pet", "Add a new pet", add_pet),
        TestCase::new(
            Suite::Pet,
            "add_pet_complete_data",
            "Add a new pet with complete data",
            add_pet_complete_data,
        ),
        TestCase::new(Suite::Pet, "get_pet_by_id", "Get pet by id", get_pet_by_id),
        TestCase::new(
            Suite::Pet,
            "update_information_pet",
            "Update pet information",
            update_information_pet,
        ),
        TestCase::new(Suite::Pet, "delete_pet_by_id", "Delete pet by id", delete_pet_by_id),
    ];

    cases.extend(STATUS_VARIANTS.iter().map(|&(status, code, body_type)| {
        TestCase::new(
            Suite::Pet,
            format!("get_pets_by_status[{status}]"),
            format!("Find pets by status \"{status}\""),
            move |ctx: &mut CaseContext<'_>| get_pets_by_status(ctx, status, code, body_type),
        )
    }));
    cases
}

fn delete_nonexistent_pet(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let id = ctx.config().missing_pet_id;
    let resp = send(ctx, "Send delete request for nonexistent pet", |c| c.delete_pet(id))?;

    ctx.step("Check response status", |_| Ok(expect_status(&resp, 200)?))?;
    ctx.step("Check response text", |_| Ok(expect_text(&resp, PET_DELETED)?))
}

fn update_nonexistent_pet(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let payload = Pet::new(
        ctx.config().missing_pet_id,
        "Non-existent Pet",
        PetStatus::Available,
    );
    let resp = send(ctx, "Send update request for nonexistent pet", |c| c.update_pet(&payload))?;

    ctx.step("Check response status", |_| Ok(expect_status(&resp, 404)?))?;
    ctx.step("Check response text", |_| Ok(expect_text(&resp, PET_NOT_FOUND)?))
}

fn get_information_nonexistent_pet(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let id = ctx.config().missing_pet_id;
    let resp = send(ctx, "Send get request for nonexistent pet", |c| c.get_pet(id))?;

    ctx.step("Check response status", |_| Ok(expect_status(&resp, 404)?))?;
    ctx.step("Check response text", |_| Ok(expect_text(&resp, PET_NOT_FOUND)?))
}

fn add_pet(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let payload = ctx.step("Prepare pet payload", |ctx| {
        Ok(Pet::new(ctx.ids().next_id(1), "Buddy", PetStatus::Available))
    })?;
    create_and_verify(ctx, &payload, &["/id", "/name", "/status"])
}

fn add_pet_complete_data(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let payload = ctx.step("Prepare pet payload", |ctx| {
        Ok(Pet::new(ctx.ids().next_id(10), "doggie", PetStatus::Available)
            .with_category(1, "Dogs")
            .with_photo_url("string")
            .with_tag(0, "string"))
    })?;
    create_and_verify(
        ctx,
        &payload,
        &[
            "/id",
            "/name",
            "/category/id",
            "/category/name",
            "/photoUrls",
            "/tags",
            "/status",
        ],
    )
}

/// `POST /pet`, then shape and echoed values as separate steps.
fn create_and_verify(
    ctx: &mut CaseContext<'_>,
    payload: &Pet,
    fields: &[&str],
) -> Result<(), CaseError> {
    let resp = send(ctx, "Send create pet request", |c| c.add_pet(payload))?;

    let body = ctx.step("Check response status and JSON schema", |ctx| {
        let body = expect_json(&resp, 200)?;
        ctx.register(Cleanup::Pet(payload.id));
        validate_schema(&body, SchemaKind::Pet).map_err(|f| resp.attach(f))?;
        Ok(body)
    })?;

    ctx.step("Check pet fields in response", |_| {
        let mismatches = compare_fields(&to_json(payload)?, &body, fields);
        all_hold(mismatches.into_iter().map(|f| resp.attach(f)).collect())
    })
}

fn get_pet_by_id(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let pet = PetFixture::create(ctx)?;
    let id = ctx.step("Get created pet id", |_| Ok(pet.id))?;

    let resp = send(ctx, "Send get pet by id request", |c| c.get_pet(id))?;

    let body = ctx.step("Check response status and pet data", |_| {
        let body = expect_json(&resp, 200)?;
        expect_field(&body, "/id", &json!(id)).map_err(|f| resp.attach(f))?;
        Ok(body)
    })?;

    ctx.step("Check pet matches the created one", |_| {
        let mismatches = compare_fields(&pet.body, &body, &["/name", "/status"]);
        all_hold(mismatches.into_iter().map(|f| resp.attach(f)).collect())
    })
}

fn update_information_pet(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let pet = PetFixture::create(ctx)?;
    let id = ctx.step("Get created pet id", |_| Ok(pet.id))?;

    let payload = ctx.step("Prepare update payload", |_| {
        Ok(Pet::new(id, "Buddy Updated", PetStatus::Sold))
    })?;

    let resp = send(ctx, "Send update pet request", |c| c.update_pet(&payload))?;

    let body = ctx.step("Check response status and pet data", |_| {
        let body = expect_json(&resp, 200)?;
        expect_field(&body, "/id", &json!(id)).map_err(|f| resp.attach(f))?;
        Ok(body)
    })?;

    ctx.step("Check pet was updated", |_| {
        let mismatches = compare_fields(&to_json(&payload)?, &body, &["/id", "/name", "/status"]);
        all_hold(mismatches.into_iter().map(|f| resp.attach(f)).collect())
    })
}

fn delete_pet_by_id(ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
    let pet = PetFixture::create(ctx)?;
    let id = ctx.step("Get created pet id", |_| Ok(pet.id))?;

    let resp = send(ctx, "Send get pet by id request", |c| c.get_pet(id))?;
    ctx.step("Check response status and pet data", |_| {
        let body = expect_json(&resp, 200)?;
        Ok(expect_field(&body, "/id", &json!(id)).map_err(|f| resp.attach(f))?)
    })?;

    let deleted = send(ctx, "Send delete pet request", |c| c.delete_pet(id))?;
    ctx.step("Check deletion succeeded", |_| {
        expect_status(&deleted, 200)?;
        Ok(expect_text(&deleted, PET_DELETED)?)
    })?;

    for label in ["Check pet is gone", "Check pet is still gone"] {
        ctx.step(label, |ctx| {
            let resp = ctx.client().get_pet(id)?;
            Ok(expect_status(&resp, 404)?)
        })?;
    }
    Ok(())
}

fn get_pets_by_status(
    ctx: &mut CaseContext<'_>,
    status: &str,
    code: u16,
    body_type: JsonType,
) -> Result<(), CaseError> {
    let resp = send(
        ctx,
        &format!("Send find pets by status request ({status:?})"),
        |c| c.find_pets_by_status(status),
    )?;

    ctx.step("Check response status and body type", |_| {
        let body = expect_json(&resp, code)?;
        Ok(expect_body_type(&body, body_type).map_err(|f| resp.attach(f))?)
    })
}
