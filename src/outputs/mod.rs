//! Output rendering.
//!
//! - [`markdown`]: renders the ranked, summarized articles into the digest
//!   text printed on standard output

pub mod markdown;
