pub mod header_label;
pub mod logging_observer;

pub use header_label::*;
pub use logging_observer::*;
