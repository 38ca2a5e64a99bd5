/// Command modules for gitsync
pub mod sync;
