mod schema;
mod models;

pub use schema::Database;
pub use models::{Node, Edge, EdgeType, NodeEmbedding};
