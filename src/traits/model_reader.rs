use crate::errors::DispatchResult;
use crate::protocol::ModelSummary;
use std::path::Path;

/// Boundary to whatever library understands model files.
///
/// Implementations are blocking; the embedded backend calls them from a
/// blocking task.
pub trait ModelReader: Send + Sync {
    fn read_model(&self, path: &Path) -> DispatchResult<ModelSummary>;
}
