pub mod content;
pub mod preferences;
pub mod presentation;
pub mod storage;
