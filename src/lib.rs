// Library surface for headless/integration tests and reuse.
// The terminal UI stays in the binary.
pub mod celebration;
pub mod config;
pub mod countdown;
pub mod geometry;
pub mod logging;
pub mod puzzle;
pub mod replay;
pub mod runtime;
pub mod session;
pub mod stability;
pub mod tracking;
