// Common test utilities and fixtures

pub mod helpers;

// Re-export commonly used items
// Note: not every test binary uses every helper
#[allow(unused_imports)]
pub use fixtures::{
    malformed_analysis, same_handle, valid_analysis, ControlledStore, CountingOpener,
    FailingOpener, FailingStore, StubWriter,
};
#[allow(unused_imports)]
pub use helpers::{
    capture_logs, create_disk_services, create_memory_services, definition_with_analysis,
    CapturedLogs,
};
