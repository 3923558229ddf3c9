//! Operator views: the precondition view shared by both generator
//! directions, and regression operators for predecessor queries.

mod operator;
mod task;
mod view;

pub use operator::{RegressionEffect, RegressionOperator};
pub use task::RegressionTask;
pub use view::IndexedOperator;
