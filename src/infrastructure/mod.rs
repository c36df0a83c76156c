pub mod fetcher;
pub mod filesystem;
pub mod observers;
pub mod plugins;
pub mod repository;

#[cfg(test)]
pub mod test_utils;

pub use fetcher::*;
pub use filesystem::*;
pub use observers::*;
pub use plugins::*;
pub use repository::*;
