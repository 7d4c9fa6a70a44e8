pub mod filesystem;
pub mod memory;

pub use filesystem::FsSource;
pub use memory::MemorySource;
