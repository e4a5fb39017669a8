use mycelica_graph::db::Database;
use mycelica_graph::error::LoadError;
use mycelica_graph::similarity::find_similar;
use mycelica_graph::utils::{truncate_id, truncate_title};
use serde::Serialize;

#[derive(Serialize)]
struct SimilarResult {
    id: String,
    title: String,
    similarity: f32,
}

pub(crate) fn handle_similar(
    db: &Database,
    json: bool,
    node_id: &str,
    top_n: usize,
    min_similarity: f32,
) -> Result<(), LoadError> {
    let node = db
        .get_node(node_id)?
        .ok_or_else(|| LoadError::NodeNotFound(node_id.to_string()))?;
    let target = db
        .get_node_embedding(node_id)?
        .ok_or_else(|| LoadError::MissingEmbedding(node_id.to_string()))?;

    let candidates = db.get_nodes_with_embeddings()?;
    let similar = find_similar(&target, &candidates, node_id, top_n, min_similarity);

    let mut results = Vec::with_capacity(similar.len());
    for s in similar {
        let title = db.get_node(&s.id)?.map(|n| n.title).unwrap_or_default();
        results.push(SimilarResult { id: s.id, title, similarity: s.similarity });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("Nodes similar to {} ({}):", truncate_id(&node.id), truncate_title(&node.title, 50));
    if results.is_empty() {
        println!("  (none above {:.2})", min_similarity);
    }
    for r in &results {
        println!("  {:.3}  {}  {}", r.similarity, truncate_id(&r.id), truncate_title(&r.title, 50));
    }
    Ok(())
}
