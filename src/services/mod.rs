pub mod populate;
pub mod statistics;

pub use populate::Populator;
pub use statistics::Statistics;
