//! Service Kit - Agent Tools
//!
//! The three tools the decision loop can pick from, each implementing
//! `mathsolver_core::Tool`.

mod calculator;
mod encyclopedia_lookup;
mod reasoning;

pub use calculator::CalculatorTool;
pub use encyclopedia_lookup::EncyclopediaTool;
pub use reasoning::ReasoningTool;
