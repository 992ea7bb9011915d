use crate::error::ExecutionError;
use crate::mapping::FieldMapping;
use crate::message::MessageKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Everything the mapping execution service needs to run one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRequest {
    pub input_xml: String,
    pub mappings: Vec<FieldMapping>,
    pub mapping_type: MessageKind,
    pub source_structure_xml: String,
    pub target_structure_xml: String,
}

/// The service's answer. `output_xml` is passed through uninterpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResponse {
    pub success: bool,
    #[serde(default)]
    pub output_xml: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A service that executes mappings against an input document.
///
/// Implementations own the transport; this crate only shapes requests and reads
/// responses.
pub trait MappingExecutor {
    fn execute(&self, request: &TestRequest) -> Result<TestResponse, ExecutionError>;
}

impl<F> MappingExecutor for F
where
    F: Fn(&TestRequest) -> Result<TestResponse, ExecutionError>,
{
    fn execute(&self, request: &TestRequest) -> Result<TestResponse, ExecutionError> {
        self(request)
    }
}

/// Runs `request` and returns the produced XML.
///
/// A response with `success = false` becomes [`ExecutionError::Backend`] carrying the
/// service's message unchanged.
pub fn run_test<E: MappingExecutor + ?Sized>(
    executor: &E,
    request: &TestRequest,
) -> Result<String, ExecutionError> {
    debug!(
        mappings = request.mappings.len(),
        kind = %request.mapping_type,
        "running mapping test"
    );
    let response = executor.execute(request)?;

    if !response.success {
        let message = response
            .error
            .unwrap_or_else(|| "mapping test failed".to_string());
        warn!(error = %message, "mapping test reported failure");
        return Err(ExecutionError::Backend(message));
    }
    response.output_xml.ok_or(ExecutionError::EmptyOutput)
}
