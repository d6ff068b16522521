pub mod errors;
pub mod input;
pub mod sam_dedup;
pub mod sam_record;
pub mod sam_utils;
