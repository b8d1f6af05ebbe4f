//! tomopeek-core - typed data model for cryo-ET visualization
//!
//! Models the entities a cryo-electron-tomography viewer renders (particle
//! positions and orientations, filaments, volumetric images, spheres) as
//! validated, named blocks that compose and keep an attached consumer in
//! sync.
//!
//! # Key Components
//!
//! - **Blocks**: one validated payload per variant ([`PointBlock`],
//!   [`LineBlock`], [`OrientationBlock`], [`ImageBlock`], [`SphereBlock`],
//!   [`PropertyBlock`]), plus the [`ParticleBlock`] composite
//! - **Named axes**: symbolic 'x'/'y'/'z' access that adapts to the payload
//!   dimensionality, addressing the trailing columns beyond 3-D
//! - **Composition algebra**: [`Merge`] (concatenation along the entity
//!   axis) and [`Stack`] (a new leading axis distinguishing originals), each
//!   copying or in place, with an explicit "unsupported" outcome for
//!   undefined routes
//! - **Crates**: [`DataCrate`], an ordered, flattening collection of
//!   heterogeneous blocks sharing one coordinate frame
//! - **Update channel**: the [`Depict`] contract; every successful payload
//!   mutation synchronously notifies the block's consumer
//!
//! The model is single-threaded and synchronous: blocks exclusively own
//! their payloads, while `parent` and depictor links are non-owning
//! back-references.

pub mod axis;
pub mod block;
pub mod collection;
pub mod combine;
pub mod depict;
pub mod error;
pub mod images;
pub mod lazy;
pub mod lines;
pub mod orientations;
pub mod particles;
pub mod points;
pub mod properties;
pub mod spheres;

pub use axis::{parse_axes, Axis};
pub use block::{Block, BlockCore, BlockId, UNNAMED};
pub use collection::{AnyBlock, DataCrate};
pub use combine::{Merge, Stack};
pub use depict::{handle, Depict, DepictorHandle};
pub use error::{BlockError, BlockResult, CombineError, CombineResult};
pub use images::ImageBlock;
pub use lazy::LazyArray;
pub use lines::LineBlock;
pub use orientations::OrientationBlock;
pub use particles::{MultiBlock, ParticleBlock};
pub use points::PointBlock;
pub use properties::PropertyBlock;
pub use spheres::SphereBlock;
