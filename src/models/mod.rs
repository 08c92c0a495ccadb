/// Logistic regression
pub mod logistic;
