// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod normalize;
mod upload;

use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "verdant-ingest";

pub use normalize::{
    normalize_workflow_response, NormalizedEmissions, RAW_EXCERPT_MAX, WRAPPER_KEYS,
};
pub use upload::{UploadFields, UPLOAD_FILE_FIELD};

#[derive(Debug)]
pub struct IngestError(pub String);

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IngestError {}
