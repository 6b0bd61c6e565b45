pub mod memory;
pub mod sheets;
pub mod auto;

pub use memory::MemoryPersistence;
pub use sheets::SheetsPersistence;
pub use auto::auto_detect_persistence;
