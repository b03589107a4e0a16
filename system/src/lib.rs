pub extern crate bincode;
pub extern crate euclid;
pub extern crate serde;
pub extern crate uuid;

mod error;
mod message;
mod raster;
mod shape;
mod traits;
mod types;

pub use error::*;
pub use message::*;
pub use raster::*;
pub use shape::*;
pub use traits::*;
pub use types::*;
