pub mod access;
pub mod extractor;
pub mod interval;
pub mod jwt;
pub mod lenient;
pub mod lock;
pub mod pagination;
pub mod test_utils;
pub mod time;
