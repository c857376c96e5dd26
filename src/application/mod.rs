pub mod screening;
pub mod executor;
pub mod monitor;
pub mod dispatcher;

pub use screening::{RetryPolicy, Screener, ScreeningError};
pub use executor::{classify_buy_error, AcquisitionExecutor, BuyFailure, ExecutorConfig, SellFailure};
pub use monitor::{ExitReport, MonitorError, PositionMonitor};
pub use dispatcher::{
    DiscoveryDispatcher, DispatchError, DispatchMode, DispatcherConfig, PipelineError,
    PositionBook, TokenOutcome, TrackedToken,
};
