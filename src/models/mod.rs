//! Data models for jobacquire.

mod job;
mod request;
mod salary;

pub use job::{JobRecord, JobRecordBuilder, LinkRecord, OutputRecord, SOURCE_TAG};
pub use request::{CrawlRequest, RequestKind};
pub use salary::{SalaryInfo, SalaryInterval};
