pub mod logger;
pub mod trace;

pub use logger::TraceLogger;
pub use trace::PassTraceEvent;
