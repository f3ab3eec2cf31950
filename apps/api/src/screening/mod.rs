// Bulk resume ranking: partition → rank every batch concurrently → stream
// each batch's outcome back as NDJSON the moment it settles.

pub mod handlers;
pub mod orchestrator;
pub mod partition;
pub mod prompts;
pub mod ranker;
pub mod stream;
