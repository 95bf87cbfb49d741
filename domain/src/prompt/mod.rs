//! Prompt construction
//!
//! Pure text transforms applied before a prompt is dispatched, and the
//! request sent to the arbiter in `best` mode.

mod template;

pub use template::PromptTemplate;
