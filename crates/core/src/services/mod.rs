pub mod market_clock;
pub mod position_service;
pub mod quote_service;
pub mod refresh_service;
pub mod scheduler;
pub mod sort_service;
pub mod valuation_service;
