//! 数据模型层

pub mod text_buffer;

pub use text_buffer::TextBuffer;
