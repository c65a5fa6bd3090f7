pub mod shuffler;
pub mod tokenizer;

// Re-export the main functions for convenience
pub use shuffler::shuffle;
pub use tokenizer::{join_tokens, tokenize, TERMINAL_PUNCTUATION};
