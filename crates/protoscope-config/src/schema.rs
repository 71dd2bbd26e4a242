use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::ProtoscopeConfig;

/// JSON schema for `protoscope.toml`, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(ProtoscopeConfig)
}
