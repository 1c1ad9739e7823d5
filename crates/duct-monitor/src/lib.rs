pub mod aggregator;
pub mod monitor_loop;
pub mod report_writer;
pub mod system_info;

pub use aggregator::Aggregator;
pub use monitor_loop::{MonitorHandle, MonitorOutcome};
pub use report_writer::ReportWriter;
