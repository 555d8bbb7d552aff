//! Test Case Catalog
//!
//! Two flat groups of scenarios, pet and store. Parametrized scenarios expand
//! to one case per variant, named `scenario[variant]`.

pub mod pet;
pub mod store;

use serde::Serialize;
use serde_json::Value;

use petcheck_core::Suite;

use crate::checks::expect_status;
use crate::client::{ApiResponse, ClientError, PetStoreClient};
use crate::context::{CaseContext, CaseError};

type CaseFn = dyn Fn(&mut CaseContext<'_>) -> Result<(), CaseError> + Send + Sync;

/// One runnable scenario.
pub struct TestCase {
    pub suite: Suite,
    /// Stable identifier used for filtering and reporting
    pub name: String,
    pub title: String,
    run: Box<CaseFn>,
}

impl TestCase {
    pub fn new(
        suite: Suite,
        name: impl Into<String>,
        title: impl Into<String>,
        run: impl Fn(&mut CaseContext<'_>) -> Result<(), CaseError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            suite,
            name: name.into(),
            title: title.into(),
            run: Box::new(run),
        }
    }

    /// Execute the scenario.
    ///
    /// # Errors
    ///
    /// Returns the first step error that stopped the case.
    pub fn run(&self, ctx: &mut CaseContext<'_>) -> Result<(), CaseError> {
        (self.run)(ctx)
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("suite", &self.suite)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Every case, pet suite first.
#[must_use]
pub fn all() -> Vec<TestCase> {
    let mut cases = pet::cases();
    cases.extend(store::cases());
    cases
}

/// Look up one case by exact name.
#[must_use]
pub fn find(name: &str) -> Option<TestCase> {
    all().into_iter().find(|c| c.name == name)
}

/// Send one request as its own step.
fn send(
    ctx: &mut CaseContext<'_>,
    label: &str,
    request: impl FnOnce(&PetStoreClient) -> Result<ApiResponse, ClientError>,
) -> Result<ApiResponse, CaseError> {
    ctx.step(label, |ctx| Ok(request(ctx.client())?))
}

/// Status matches, then the body parses as JSON.
fn expect_json(resp: &ApiResponse, status: u16) -> Result<Value, CaseError> {
    expect_status(resp, status)?;
    Ok(resp.json()?)
}

fn to_json<T: Serialize>(payload: &T) -> Result<Value, CaseError> {
    serde_json::to_value(payload).map_err(|e| ClientError::Encode(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_every_scenario_once() {
        let cases = all();
        assert_eq!(cases.len(), 18);
        let names: HashSet<&str> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), cases.len());
    }

    #[test]
    fn suites_split() {
        let cases = all();
        let pet = cases.iter().filter(|c| c.suite == Suite::Pet).count();
        let store = cases.iter().filter(|c| c.suite == Suite::Store).count();
        assert_eq!((pet, store), (13, 5));
    }

    #[test]
    fn parametrized_names() {
        let names: Vec<String> = pet::cases()
            .into_iter()
            .map(|c| c.name)
            .filter(|n| n.starts_with("get_pets_by_status"))
            .collect();
        assert_eq!(
            names,
            vec![
                "get_pets_by_status[available]",
                "get_pets_by_status[pending]",
                "get_pets_by_status[sold]",
                "get_pets_by_status[unavailable]",
                "get_pets_by_status[]",
            ]
        );
    }

    #[test]
    fn find_by_exact_name() {
        assert_eq!(find("get_store_inventory").unwrap().suite, Suite::Store);
        assert!(find("get_store").is_none());
    }

    #[test]
    fn debug_omits_closure() {
        let case = find("add_pet").unwrap();
        let dbg = format!("{case:?}");
        assert!(dbg.contains("add_pet"));
        assert!(dbg.ends_with(".. }"));
    }
}
