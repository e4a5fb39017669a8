use serde::{Deserialize, Serialize};

/// Relation type of an edge.
///
/// The vocabulary is owned by whoever writes the graph, so anything not listed
/// here is kept verbatim in `Unknown` instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeType {
    Related,
    Summarizes,
    DerivesFrom,
    Contains,
    Reference,
    BelongsTo,  // Item belongs to category (multi-path associations)
    Supports,
    Contradicts,
    Supersedes,
    Unknown(String),
}

impl EdgeType {
    pub fn as_str(&self) -> &str {
        match self {
            EdgeType::Related => "related",
            EdgeType::Summarizes => "summarizes",
            EdgeType::DerivesFrom => "derives_from",
            EdgeType::Contains => "contains",
            EdgeType::Reference => "reference",
            EdgeType::BelongsTo => "belongs_to",
            EdgeType::Supports => "supports",
            EdgeType::Contradicts => "contradicts",
            EdgeType::Supersedes => "supersedes",
            EdgeType::Unknown(s) => s.as_str(),
        }
    }

    /// Parse a stored tag. Matching is case-insensitive; unrecognized tags
    /// become `Unknown` with the original spelling.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "related" => EdgeType::Related,
            "summarizes" => EdgeType::Summarizes,
            "derives_from" => EdgeType::DerivesFrom,
            "contains" => EdgeType::Contains,
            "reference" => EdgeType::Reference,
            "belongs_to" => EdgeType::BelongsTo,
            "supports" => EdgeType::Supports,
            "contradicts" => EdgeType::Contradicts,
            "supersedes" => EdgeType::Supersedes,
            _ => EdgeType::Unknown(s.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EdgeType::Unknown(_))
    }
}

impl From<String> for EdgeType {
    fn from(s: String) -> Self {
        EdgeType::parse(&s)
    }
}

impl From<&str> for EdgeType {
    fn from(s: &str) -> Self {
        EdgeType::parse(s)
    }
}

impl From<EdgeType> for String {
    fn from(t: EdgeType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// depth: 0 = Universe (root), increases toward items
// is_item: true = openable content (conversations, notes, etc.)

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub title: String,
    pub content: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    pub depth: i32,
    #[serde(rename = "isItem")]
    pub is_item: bool,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,

    // Note: Embeddings stored in DB but not loaded into Node struct (too large)
    // Use get_node_embedding() / get_nodes_with_embeddings() for similarity search
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<i64>,
}

/// A node id paired with its decoded embedding vector.
#[derive(Debug, Clone)]
pub struct NodeEmbedding {
    pub id: String,
    pub embedding: Vec<f32>,
}
