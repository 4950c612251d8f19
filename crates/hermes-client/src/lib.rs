//! hermes-client: Client for the remote exoplanet classification service.
//!
//! Request builders validate everything they can before a request is made;
//! responses are validated per endpoint before anything touches local state.

pub mod error;
pub mod wire;
pub mod catalog;
pub mod batch;
pub mod retrain;
pub mod single;
pub mod client;
pub mod loader;

pub use batch::{
    apply_predictions, build_classification_payload, check_classification, merge_predictions, prediction_targets,
    prepare_classification, Payload,
};
pub use catalog::{ModelCatalog, ModelSelection};
pub use client::{ClassifierApi, HermesClient};
pub use error::{ApiError, ClientError, ValidationError};
pub use loader::ModelsLoader;
pub use retrain::{build_retrain_payload, prepare_retrain, RetrainTarget};
pub use single::{FieldValue, SingleEntryForm};
pub use wire::{PredictResponse, RetrainResponse, SinglePredictResponse};
