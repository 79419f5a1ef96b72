pub mod builder;
pub mod error;
pub mod input;
pub mod reports;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use builder::{build_and_submit, build_task_request, submit_task};
pub use error::TaskError;
pub use input::{TaskInput, ValidatedInput};
pub use reports::{list_reports, ReportListing};
pub use resolver::resolve_association;
