pub mod flatten;
pub mod operations;
pub mod tree;
