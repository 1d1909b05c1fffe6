pub mod filename;
pub mod multipart;
pub mod storage;
