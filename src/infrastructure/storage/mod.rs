//! On-disk persistence of stage outputs

pub mod artifact_store;

pub use artifact_store::{
    ArtifactStore, ANALYSIS_FILE, SANDWICHES_FILE, SIGNATURES_FILE, SLOT_LEADERS_FILE,
};
