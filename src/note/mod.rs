pub mod highlight;
pub mod sections;
pub mod view;
