pub mod position;
pub mod quote;
pub mod settings;
pub mod sort;
pub mod valuation;
