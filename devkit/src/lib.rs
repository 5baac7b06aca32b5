/*!
# Jobwatch DevKit - stubs and test utilities

Lets the check cycle run without a SQL Server:
- `StubJobSource`: canned failed-job rows or a canned failure
- `MemoryHistoryStore` / `FailingHistoryStore`: history without a filesystem
- `TestHarness`: runs consecutive checks against one shared history
*/

pub mod source_stub;
pub mod store_stub;
pub mod test_utils;

pub use source_stub::StubJobSource;
pub use store_stub::{FailingHistoryStore, MemoryHistoryStore};
pub use test_utils::TestHarness;
