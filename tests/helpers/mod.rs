#![allow(dead_code)]

use std::path::PathBuf;

use kbqa::config::RetrievalConfig;
use kbqa::db;
use kbqa::kb::store::create_entry;
use kbqa::kb::types::KnowledgeEntry;
use kbqa::kb::SqliteKnowledgeSource;
use kbqa::llm::{AnswerGenerator, GenerateError, GenerationRequest, NullGenerator};
use kbqa::qa::answer::QaService;
use kbqa::qa::KnowledgeSource;
use rusqlite::Connection;
use tempfile::TempDir;

/// A file-backed database in a fresh temp dir. Keep the `TempDir` alive for
/// the duration of the test.
pub fn temp_db() -> (TempDir, PathBuf, Connection) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("kbqa.db");
    let conn = db::open_database(&path).unwrap();
    (tmp, path, conn)
}

/// Insert entries in order; later pairs get higher ids. Returns the ids.
pub fn seed(conn: &Connection, pairs: &[(&str, &str)]) -> Vec<i64> {
    pairs
        .iter()
        .map(|(q, a)| create_entry(conn, q, a).unwrap())
        .collect()
}

/// QA service over the database at `path` with no language model.
pub fn offline_service(path: &PathBuf) -> QaService {
    service_with(path, Box::new(NullGenerator))
}

pub fn service_with(path: &PathBuf, generator: Box<dyn AnswerGenerator>) -> QaService {
    QaService::new(
        Box::new(SqliteKnowledgeSource::new(path.clone())),
        generator,
        RetrievalConfig::default(),
    )
}

/// Always replies with the same text.
pub struct StubGenerator(pub &'static str);

impl AnswerGenerator for StubGenerator {
    fn generate(&self, _request: &GenerationRequest<'_>) -> Result<String, GenerateError> {
        Ok(self.0.to_string())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Always fails like an unreachable upstream.
pub struct UnreachableGenerator;

impl AnswerGenerator for UnreachableGenerator {
    fn generate(&self, _request: &GenerationRequest<'_>) -> Result<String, GenerateError> {
        Err(GenerateError::Status(503))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

/// A store that cannot be read.
pub struct BrokenSource;

impl KnowledgeSource for BrokenSource {
    fn load_entries(&self) -> anyhow::Result<Vec<KnowledgeEntry>> {
        anyhow::bail!("disk on fire")
    }

    fn system_prompt(&self) -> anyhow::Result<Option<String>> {
        anyhow::bail!("disk on fire")
    }
}
