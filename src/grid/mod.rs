//! Structured-grid geometry: extents, masks, coordinates, and the three
//! grid flavors.

pub mod coords;
pub mod curvilinear;
pub mod extent;
pub mod image;
pub mod locator;
pub mod masks;
pub mod rectilinear;

pub use coords::{float_eq, CoordArray, TickValue};
pub use curvilinear::{CurvilinearGrid, FacePatch};
pub use extent::Extent;
pub use image::ImageGrid;
pub use masks::{AdjacencyMask, Contact, OverlapMask};
pub use rectilinear::RectilinearGrid;
