//! Client side of the search engine: collects a query and a retrieval model, posts them
//! to the server and renders the returned envelope.

pub mod controller;
pub mod input;
pub mod render;
pub mod shell;

pub use controller::{Endpoint, SearchController, SubmitOutcome, apply_envelope};
pub use input::{AlgorithmSelector, KeyAction, QueryInput, SearchForm};
pub use render::{NO_RESULTS_MESSAGE, Surface, TerminalSurface, Theme, render_results};
pub use shell::{Shell, ShellStep};
