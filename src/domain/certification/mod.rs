pub mod check_error;
pub mod check_result;
pub mod help_text;
pub mod level;
pub mod metadata;
pub mod outcome;
pub mod report;
