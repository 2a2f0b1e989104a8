//! Sheet file formats: `.grd` load/save and Markdown export.

mod md;
mod parser;
mod writer;

pub use md::{markdown_content, write_markdown};
pub use parser::{parse_grd, parse_grd_content};
pub use writer::{write_grd, write_grd_content};
