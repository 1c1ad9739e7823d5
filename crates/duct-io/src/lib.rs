pub mod paths;
pub mod tee;

pub use paths::LogPaths;
pub use tee::Tee;
