//! Article capture: header grammar table, splitter, processor, and the
//! body heuristics.

pub mod body;
pub mod process;
pub mod split;
pub mod table;

pub use body::{check_included_text, count_lines};
pub use process::{check_from, process_headers};
pub use split::{split_off_headers, ArticleHeaders, HeaderSlot};
pub use table::{Hdr, HeaderKind, HeaderSpec, HEADER_COUNT, HEADER_TABLE};
