mod error_handling;
mod parsing;
