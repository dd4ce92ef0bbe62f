mod error;
mod reader;
mod writer;

pub use error::DecodeError;
pub use reader::ByteReader;
pub use writer::ByteWriter;
