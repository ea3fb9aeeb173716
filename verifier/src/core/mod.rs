//! Pure, deterministic logic: extraction, summaries, badges, document splicing.

pub mod badges;
pub mod combined;
pub mod extract;
pub mod summary;
pub mod types;
