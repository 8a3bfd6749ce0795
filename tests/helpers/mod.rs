pub mod pass_helpers;
pub mod source_fixtures;
