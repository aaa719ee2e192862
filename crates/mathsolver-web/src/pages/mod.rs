//! Page Components

mod solver;

pub use solver::SolverPage;
