pub mod catalog;
pub mod history;
pub mod profiles;
pub mod recommendations;
pub mod scoring;

pub use history::WatchHistory;
pub use recommendations::Recommender;
pub use scoring::{RandomScores, ScoreSource, SeededScores};
