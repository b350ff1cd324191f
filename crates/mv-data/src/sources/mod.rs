pub mod csv_source;
pub mod memory;

pub use csv_source::read_csv_records;
pub use memory::MemoryDataset;
