//! Question vector store with JSON persistence and brute-force KNN search.
//!
//! Each indexed record is stored with the embedding of its
//! [`QuestionRecord::document`] text. Distances are squared Euclidean
//! (lower = more similar). An embedding call that fails is replaced by a zero
//! vector so one bad call never blocks a whole batch; such entries are logged
//! and flagged `degraded`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::provider::Embedder;
use crate::question::{question_id, IndexedQuestion, QuestionRecord};
use crate::store::block::parse_questions;

/// File names are cut at this delimiter to derive the video id.
const VIDEO_ID_DELIMITER: &str = "_section";

// ---------------------------------------------------------------------------
// Stored layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredQuestion {
    id: String,
    video_id: String,
    question_index: usize,
    record: QuestionRecord,
    document: String,
    embedding: Vec<f32>,
    #[serde(default)]
    degraded: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collection {
    name: String,
    description: String,
    entries: Vec<StoredQuestion>,
}

// ---------------------------------------------------------------------------
// ScoredQuestion
// ---------------------------------------------------------------------------

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredQuestion {
    pub id: String,
    pub record: QuestionRecord,
    /// Squared Euclidean distance to the query; lower is more similar.
    pub similarity_score: f32,
}

// ---------------------------------------------------------------------------
// QuestionVectorStore
// ---------------------------------------------------------------------------

/// Owns every indexed question. Records are immutable once indexed.
pub struct QuestionVectorStore {
    embedder: Arc<dyn Embedder>,
    dimensions: usize,
    /// `None` keeps the collection in memory only.
    path: Option<PathBuf>,
    collection: Collection,
}

impl QuestionVectorStore {
    /// A store that is never written to disk.
    pub fn in_memory(embedder: Arc<dyn Embedder>, dimensions: usize) -> Self {
        Self {
            embedder,
            dimensions,
            path: None,
            collection: Collection::new("questions"),
        }
    }

    /// Open (or create) `<persist_dir>/<collection>.json`.
    pub fn open(
        config: &StoreConfig,
        embedder: Arc<dyn Embedder>,
        dimensions: usize,
    ) -> Result<Self, StoreError> {
        let path = config.persist_dir.join(format!("{}.json", config.collection));
        let collection = if path.exists() {
            let data = std::fs::read(&path)?;
            serde_json::from_slice(&data)?
        } else {
            Collection::new(&config.collection)
        };
        log::info!(
            "store: opened {} with {} questions",
            path.display(),
            collection.entries.len()
        );
        Ok(Self {
            embedder,
            dimensions,
            path: Some(path),
            collection,
        })
    }

    pub fn len(&self) -> usize {
        self.collection.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.entries.is_empty()
    }

    /// Number of entries whose embedding is a zero-vector substitute.
    pub fn degraded_count(&self) -> usize {
        self.collection.entries.iter().filter(|e| e.degraded).count()
    }

    // -----------------------------------------------------------------------
    // Indexing
    // -----------------------------------------------------------------------

    /// Parse `block` and index every well-formed record under `video_id`.
    ///
    /// Returns the newly indexed questions; ids that already exist are left
    /// untouched and skipped.
    pub async fn index(
        &mut self,
        block: &str,
        video_id: &str,
    ) -> Result<Vec<IndexedQuestion>, StoreError> {
        let records = parse_questions(block);
        self.add_questions(records, video_id).await
    }

    /// Read a structured question file and index it under the video id
    /// derived from its name.
    pub async fn index_file(&mut self, path: &Path) -> Result<Vec<IndexedQuestion>, StoreError> {
        let block = tokio::fs::read_to_string(path).await?;
        let video_id = video_id_from_path(path);
        let indexed = self.index(&block, &video_id).await?;
        log::info!(
            "store: indexed {} questions from {}",
            indexed.len(),
            path.display()
        );
        Ok(indexed)
    }

    /// Embed and store `records`, numbering them from 0 in order.
    pub async fn add_questions(
        &mut self,
        records: Vec<QuestionRecord>,
        video_id: &str,
    ) -> Result<Vec<IndexedQuestion>, StoreError> {
        let mut indexed = Vec::with_capacity(records.len());

        for (question_index, record) in records.into_iter().enumerate() {
            let id = question_id(video_id, question_index);
            if self.contains(&id) {
                log::warn!("store: {id} is already indexed, skipping");
                continue;
            }

            let document = record.document();
            let (embedding, degraded) = self.embed_or_zero(&document).await;

            self.collection.entries.push(StoredQuestion {
                id,
                video_id: video_id.to_string(),
                question_index,
                record: record.clone(),
                document,
                embedding,
                degraded,
            });
            indexed.push(IndexedQuestion {
                video_id: video_id.to_string(),
                question_index,
                record,
            });
        }

        if !indexed.is_empty() {
            self.persist()?;
        }
        Ok(indexed)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The `k` stored records nearest to `query`, nearest first.
    pub async fn search(&self, query: &str, k: usize) -> Vec<ScoredQuestion> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }
        let (query_vec, _) = self.embed_or_zero(query).await;

        let mut hits: Vec<ScoredQuestion> = self
            .collection
            .entries
            .iter()
            .map(|entry| ScoredQuestion {
                id: entry.id.clone(),
                record: entry.record.clone(),
                similarity_score: squared_l2(&query_vec, &entry.embedding),
            })
            .collect();

        hits.sort_by(|a, b| a.similarity_score.total_cmp(&b.similarity_score));
        hits.truncate(k);
        hits
    }

    pub fn get(&self, id: &str) -> Option<QuestionRecord> {
        self.collection
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.record.clone())
    }

    fn contains(&self, id: &str) -> bool {
        self.collection.entries.iter().any(|e| e.id == id)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn embed_or_zero(&self, text: &str) -> (Vec<f32>, bool) {
        match self.embedder.embed(text).await {
            Ok(vector) => (vector, false),
            Err(e) => {
                log::warn!("store: embedding failed, using zero vector (degraded): {e}");
                (vec![0.0; self.dimensions], true)
            }
        }
    }

    /// Write the collection through a temp file so a crash never leaves a
    /// half-written index behind.
    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let data = serde_json::to_vec_pretty(&self.collection)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, &data)?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl Collection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: "French listening comprehension questions".into(),
            entries: Vec::new(),
        }
    }
}

/// `"data/questions/wqkIJLMR_section1.txt"` → `"wqkIJLMR"`.
pub fn video_id_from_path(path: &Path) -> String {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.find(VIDEO_ID_DELIMITER) {
        Some(cut) => name[..cut].to_string(),
        None => name,
    }
}

/// Squared Euclidean distance; missing trailing components count as zero.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    long.iter()
        .enumerate()
        .map(|(i, x)| {
            let d = x - short.get(i).copied().unwrap_or(0.0);
            d * d
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockEmbedder;
    use crate::question::AnswerLetter;
    use tempfile::tempdir;

    const DIMS: usize = 64;

    const BLOCK: &str = "\
<question>
Introduction:
Martin présente son nom, sa nationalité et son âge.
Question: Comment s'appelle Martin?
Options: a. Jean b. Martin c. Pierre d. Philippe
Answer: b
</question>
<question>
Introduction:
Une annonce à la gare de Lyon.
Question:
À quelle heure part le train pour Marseille?
Options:
a. 8h
b. 9h
c. 10h
d. 11h
Answer:
c. 10h
</question>
<question>
Introduction:
Sophie parle de ses vacances à la montagne.
Question:
Où Sophie est-elle partie en vacances?
Options:
a. À la mer
b. À la montagne
c. En ville
d. À la campagne
</question>
";

    fn memory_store() -> QuestionVectorStore {
        QuestionVectorStore::in_memory(Arc::new(MockEmbedder::new(DIMS)), DIMS)
    }

    #[tokio::test]
    async fn index_then_get_returns_parsed_fields() {
        let mut store = memory_store();
        let parsed = parse_questions(BLOCK);
        let indexed = store.index(BLOCK, "wqkIJLMR").await.unwrap();

        assert_eq!(indexed.len(), 3);
        assert_eq!(store.len(), 3);
        for (item, original) in indexed.iter().zip(&parsed) {
            assert_eq!(store.get(&item.id()).as_ref(), Some(original));
        }

        let martin = store.get("wqkIJLMR_0").unwrap();
        assert_eq!(martin.options[1], "Martin");
        assert_eq!(martin.answer, Some(AnswerLetter::B));
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let store = memory_store();
        assert!(store.get("nope_0").is_none());
    }

    #[tokio::test]
    async fn search_own_document_ranks_itself_first() {
        let mut store = memory_store();
        store.index(BLOCK, "vid").await.unwrap();

        let target = store.get("vid_1").unwrap();
        let hits = store.search(&target.document(), 3).await;

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, "vid_1");
        assert_eq!(hits[0].similarity_score, 0.0);
        assert!(hits
            .windows(2)
            .all(|w| w[0].similarity_score <= w[1].similarity_score));
    }

    #[tokio::test]
    async fn search_truncates_to_k() {
        let mut store = memory_store();
        store.index(BLOCK, "vid").await.unwrap();

        assert_eq!(store.search("Martin", 1).await.len(), 1);
        assert!(store.search("Martin", 0).await.is_empty());
    }

    #[tokio::test]
    async fn failed_embedding_degrades_to_zero_vector() {
        let embedder = Arc::new(MockEmbedder::failing_on(DIMS, "gare"));
        let mut store = QuestionVectorStore::in_memory(embedder, DIMS);

        let indexed = store.index(BLOCK, "vid").await.unwrap();

        assert_eq!(indexed.len(), 3, "one bad embedding must not block the batch");
        assert_eq!(store.degraded_count(), 1);
        let entry = store
            .collection
            .entries
            .iter()
            .find(|e| e.id == "vid_1")
            .unwrap();
        assert!(entry.degraded);
        assert_eq!(entry.embedding, vec![0.0; DIMS]);
    }

    #[tokio::test]
    async fn reindexing_existing_ids_is_skipped() {
        let mut store = memory_store();
        store.index(BLOCK, "vid").await.unwrap();
        let again = store.index(BLOCK, "vid").await.unwrap();

        assert!(again.is_empty());
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn persisted_store_reloads() {
        let dir = tempdir().unwrap();
        let config = StoreConfig {
            persist_dir: dir.path().join("vectorstore"),
            collection: "questions".into(),
        };

        {
            let embedder = Arc::new(MockEmbedder::new(DIMS));
            let mut store = QuestionVectorStore::open(&config, embedder, DIMS).unwrap();
            store.index(BLOCK, "vid").await.unwrap();
        }

        let reopened =
            QuestionVectorStore::open(&config, Arc::new(MockEmbedder::new(DIMS)), DIMS).unwrap();
        assert_eq!(reopened.len(), 3);
        assert_eq!(
            reopened.get("vid_2").unwrap().question,
            "Où Sophie est-elle partie en vacances?"
        );
    }

    #[tokio::test]
    async fn index_file_derives_video_id() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("wqkIJLMR_section2.txt");
        std::fs::write(&file, BLOCK).unwrap();

        let mut store = memory_store();
        let indexed = store.index_file(&file).await.unwrap();

        assert_eq!(indexed[0].video_id, "wqkIJLMR");
        assert!(store.get("wqkIJLMR_2").is_some());
    }

    #[test]
    fn video_id_without_delimiter_is_whole_stem() {
        assert_eq!(video_id_from_path(Path::new("data/abc123.txt")), "abc123");
        assert_eq!(
            video_id_from_path(Path::new("data/abc123_section1.txt")),
            "abc123"
        );
    }

    #[test]
    fn squared_l2_pads_shorter_vector() {
        assert_eq!(squared_l2(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert_eq!(squared_l2(&[3.0, 4.0], &[0.0, 0.0]), 25.0);
        assert_eq!(squared_l2(&[1.0], &[1.0, 2.0]), 4.0);
    }
}
