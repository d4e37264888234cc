pub mod dialog;
pub mod help;
pub mod listing;
pub mod status_bar;
pub mod tree;
