//! Buffer sizing, consumption monitoring and completion forecasting.

mod consumption;
mod forecast;
mod sizing;

pub use consumption::{
    chain_overrun, chain_reading, consumption_percentage, task_overrun, task_reading,
};
pub use forecast::{chain_progress, estimated_completion_date};
pub use sizing::buffer_size;
