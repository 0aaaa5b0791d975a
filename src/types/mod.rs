pub mod advisory;
pub mod market;
pub mod signal;
pub mod timeframe;
pub mod ws;

pub use advisory::*;
pub use market::*;
pub use signal::*;
pub use timeframe::*;
pub use ws::*;
