pub mod calendar_view;
pub mod screen;
pub mod theme;

pub use calendar_view::*;
pub use screen::*;
pub use theme::*;
