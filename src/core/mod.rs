pub mod compliance;
pub mod etl;
pub mod fetch;
pub mod imaging;
pub mod mrl;
pub mod reference;

pub use crate::domain::model::{Record, TransformResult};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
