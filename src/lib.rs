//! Local knowledge-base question answering.
//!
//! Questions are matched against stored question/answer pairs with
//! character-bigram cosine similarity, which works for Chinese and other
//! scripts without word boundaries and needs no dictionary or model. The best
//! match can optionally be rephrased by an OpenAI-compatible chat-completion
//! endpoint; every failure along that path degrades to the stored answer or a
//! fixed reply.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite initialization, schema, migrations, and health checks
//! - [`kb`] — Knowledge-base CRUD and the system prompt setting
//! - [`qa`] — Normalization, bigram scoring, retrieval, and answer composition
//! - [`llm`] — The answer-generator seam and the chat-completion client
//! - [`server`] — HTTP routes over the store and the answer composer

pub mod config;
pub mod db;
pub mod kb;
pub mod llm;
pub mod qa;
pub mod server;
