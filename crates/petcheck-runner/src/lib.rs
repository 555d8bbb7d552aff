//! petcheck-runner: black-box contract cases for the Pet Store API
//!
//! Sends real requests to a live server. Nothing here stubs or mocks the API.

pub mod catalog;
pub mod checks;
pub mod client;
pub mod context;
pub mod fixture;
pub mod ids;
pub mod runner;

pub use catalog::TestCase;
pub use client::{ApiResponse, ClientError, PetStoreClient};
pub use context::{CaseContext, CaseError};
pub use ids::IdAllocator;
pub use runner::{RunnerError, SuiteRunner, run_case};
