//! Graph persistence.
//!
//! The on-disk form is JSON `{ nodes, edges, incidents }`.  Derived indexes
//! are never written; they are rebuilt by [`Graph::build`] on load.  Saves go
//! through a uniquely named temp file in the same directory and a rename, so
//! a crash mid-save leaves the previous file intact and two writers never
//! share a temp file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use sr_core::IncidentReport;

use crate::graph::Graph;
use crate::model::{Edge, Node};
use crate::GraphResult;

#[derive(Serialize)]
struct GraphDataRef<'a> {
    nodes:     &'a [Node],
    edges:     &'a [Edge],
    incidents: &'a [IncidentReport],
}

#[derive(Deserialize)]
struct GraphData {
    #[serde(default)]
    nodes:     Vec<Node>,
    #[serde(default)]
    edges:     Vec<Edge>,
    #[serde(default)]
    incidents: Vec<IncidentReport>,
}

/// Load the graph saved at `path`.  A missing file yields an empty graph.
///
/// # Errors
///
/// [`GraphError::Io`](crate::GraphError::Io) / [`GraphError::Json`](crate::GraphError::Json)
/// on unreadable or malformed files, and
/// [`GraphError::InvalidGraph`](crate::GraphError::InvalidGraph) if the saved
/// edges no longer line up with the saved nodes.
pub fn load(path: &Path) -> GraphResult<Graph> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no saved graph, starting empty");
        return Ok(Graph::empty());
    }
    let reader = BufReader::new(File::open(path)?);
    let data: GraphData = serde_json::from_reader(reader)?;
    let graph = Graph::build(data.nodes, data.edges, data.incidents)?;
    tracing::info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        incidents = graph.incident_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Save `graph` to `path`, creating parent directories as needed.
pub fn save(path: &Path, graph: &Graph) -> GraphResult<()> {
    let dir = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            dir
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let data = GraphDataRef {
            nodes:     graph.nodes(),
            edges:     graph.edges(),
            incidents: graph.incidents(),
        };
        serde_json::to_writer(&mut writer, &data)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), "graph saved");
    Ok(())
}
