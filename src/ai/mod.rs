mod agent;
pub mod minimax;
pub mod ntuple;
mod random;
pub mod tdl;

pub use agent::Agent;
pub use minimax::{Heuristic, MinimaxAgent, SearchConfig, SearchResult, WindowHeuristic};
pub use ntuple::{NTupleNetwork, ValueFunction};
pub use random::RandomAgent;
pub use tdl::{TdlAgent, TdlConfig, TdlTrainingState};
