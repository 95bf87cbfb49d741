//! Chat persistence
//!
//! Provides [`JsonlChatStore`], a JSONL file store that implements the
//! [`ChatRecorder`](hotbox_application::ChatRecorder) port.

mod jsonl_store;

pub use jsonl_store::JsonlChatStore;
