//! Bibliographic reference classification over a chat-completion model.
//!
//! A workbook of references goes in, each row is classified by the model
//! with a fixed few-shot prompt, and the workbook comes back with a
//! `Predictions` sheet appended.

pub mod api;
pub mod biblio;
pub mod cli;
pub mod config;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod workbook;
