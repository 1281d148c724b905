// Adapters layer: concrete implementations for external systems (LLM API, index blob, answer log).

pub mod csv_log;
pub mod index_loader;
pub mod openai;
