//! Shared utility functions.
//!
//! - `html`: allow-list sanitizing and HTML-to-text flattening
//! - `salary`: salary text parsing

mod html;
mod salary;

pub use html::{
    collapse_whitespace, decode_encoded_markup, decode_entities, element_plain_text, sanitize,
    sanitize_element, to_plain_text,
};
pub use salary::{detect_currency, detect_interval, parse_salary};
