use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    network::element::Elements,
    topology::source::{TopologyResult, TopologySource},
};

/// Reads a JSON snapshot in the `{nodes, edges}` wire format.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TopologySource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_elements(&self) -> TopologyResult<Elements> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        Ok(Elements::from_json(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::source::TopologyError;

    #[tokio::test]
    async fn reads_snapshot() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/three_hop.json");
        let elements = FileSource::new(path).fetch_elements().await.unwrap();
        assert_eq!(elements.nodes.len(), 3);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("nope.json"));
        assert!(matches!(source.fetch_elements().await, Err(TopologyError::Io(_))));
    }

    #[tokio::test]
    async fn invalid_json_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"nodes\": 3}").unwrap();
        assert!(matches!(
            FileSource::new(path).fetch_elements().await,
            Err(TopologyError::Decode(_))
        ));
    }
}
