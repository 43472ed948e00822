pub mod monte_carlo;

pub use monte_carlo::{run_balance, run_balance_range, run_balance_sequential, BalanceReport};
