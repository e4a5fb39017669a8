pub mod db;
pub mod error;
pub mod graph_analysis;
pub mod settings;
pub mod similarity;
pub mod utils;
