//! Pure transformations: no I/O, no clocks of their own.

pub mod rate;
pub mod validation;

pub use rate::Throughput;
pub use validation::{
    check_size, declared_length, exceeds_declared, interrupted_body, is_success,
    parse_content_length, parse_uri,
};
