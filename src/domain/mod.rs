pub mod calendar;
pub mod date_key;
pub mod date_range;
pub mod event_index;
pub mod machine;
pub mod picker;
pub mod projector;
pub mod scope;

pub use calendar::*;
pub use date_key::*;
pub use date_range::*;
pub use event_index::*;
pub use machine::*;
pub use picker::*;
pub use projector::*;
pub use scope::*;
