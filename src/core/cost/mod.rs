pub mod calculator;
pub mod pricing;
pub mod scanner;
