pub mod dat;
pub mod error;
pub mod writer;

pub use dat::{DatFile, DatFormat, parse_dat, parse_dat_file};
pub use error::DatError;
pub use writer::{write_dat, write_dat_file};
