//! Heterogeneous blocks and crates
//!
//! [`AnyBlock`] is the sum of every block variant and carries the
//! heterogeneous composition dispatch: same-variant operand sets forward to
//! the concrete merge/stack primitive, everything else produces the sentinel
//! "unsupported" outcome so callers can try another composition route.
//!
//! A [`DataCrate`] is an ordered, flattening collection of blocks believed
//! to share one coordinate frame. Crate composition is pure container
//! concatenation; it never touches the payloads inside its members.

use std::fmt;

use crate::block::{Block, BlockCore, BlockId, UNNAMED};
use crate::combine::{ensure_nonempty, Merge, Stack};
use crate::error::{CombineError, CombineResult};
use crate::images::ImageBlock;
use crate::lines::LineBlock;
use crate::orientations::OrientationBlock;
use crate::particles::ParticleBlock;
use crate::points::PointBlock;
use crate::properties::PropertyBlock;
use crate::spheres::SphereBlock;

/// Any block a crate can hold
#[derive(Debug)]
pub enum AnyBlock {
    Points(PointBlock),
    Line(LineBlock),
    Orientations(OrientationBlock),
    Image(ImageBlock),
    Sphere(SphereBlock),
    Properties(PropertyBlock),
    Particles(ParticleBlock),
}

macro_rules! collect_variant {
    ($blocks:expr, $variant:path) => {{
        let typed: Option<Vec<_>> = $blocks
            .iter()
            .map(|block| match block {
                $variant(inner) => Some(inner),
                _ => None,
            })
            .collect();
        typed
    }};
}

impl AnyBlock {
    /// Short variant name used in composition outcomes and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            AnyBlock::Points(_) => "points",
            AnyBlock::Line(_) => "line",
            AnyBlock::Orientations(_) => "orientations",
            AnyBlock::Image(_) => "image",
            AnyBlock::Sphere(_) => "sphere",
            AnyBlock::Properties(_) => "properties",
            AnyBlock::Particles(_) => "particles",
        }
    }

    fn unsupported(op: &'static str, blocks: &[&AnyBlock]) -> CombineError {
        let lhs = blocks[0].kind();
        let rhs = blocks
            .iter()
            .map(|block| block.kind())
            .find(|&kind| kind != lhs)
            .unwrap_or(lhs);
        CombineError::Unsupported { op, lhs, rhs }
    }

    /// Merge heterogeneous operands. Same-variant sets dispatch to the
    /// concrete primitive; mixed sets and variants without merge produce
    /// the sentinel outcome.
    pub fn merge(blocks: &[&AnyBlock]) -> CombineResult<AnyBlock> {
        ensure_nonempty(blocks, "merge")?;
        tracing::debug!(
            op = "merge",
            kind = blocks[0].kind(),
            count = blocks.len(),
            "combining blocks"
        );
        match blocks[0] {
            AnyBlock::Points(_) => match collect_variant!(blocks, AnyBlock::Points) {
                Some(typed) => Ok(AnyBlock::Points(PointBlock::merge(&typed)?)),
                None => Err(Self::unsupported("merge", blocks)),
            },
            AnyBlock::Line(_) => match collect_variant!(blocks, AnyBlock::Line) {
                Some(typed) => Ok(AnyBlock::Line(LineBlock::merge(&typed)?)),
                None => Err(Self::unsupported("merge", blocks)),
            },
            AnyBlock::Orientations(_) => match collect_variant!(blocks, AnyBlock::Orientations) {
                Some(typed) => Ok(AnyBlock::Orientations(OrientationBlock::merge(&typed)?)),
                None => Err(Self::unsupported("merge", blocks)),
            },
            AnyBlock::Properties(_) => match collect_variant!(blocks, AnyBlock::Properties) {
                Some(typed) => Ok(AnyBlock::Properties(PropertyBlock::merge(&typed)?)),
                None => Err(Self::unsupported("merge", blocks)),
            },
            AnyBlock::Particles(_) => match collect_variant!(blocks, AnyBlock::Particles) {
                Some(typed) => Ok(AnyBlock::Particles(ParticleBlock::merge(&typed)?)),
                None => Err(Self::unsupported("merge", blocks)),
            },
            AnyBlock::Image(_) | AnyBlock::Sphere(_) => {
                Err(Self::unsupported("merge", blocks))
            }
        }
    }

    /// Stack heterogeneous operands. Points, lines and images stack; every
    /// other variant produces the sentinel outcome.
    pub fn stack(blocks: &[&AnyBlock]) -> CombineResult<AnyBlock> {
        ensure_nonempty(blocks, "stack")?;
        tracing::debug!(
            op = "stack",
            kind = blocks[0].kind(),
            count = blocks.len(),
            "combining blocks"
        );
        match blocks[0] {
            AnyBlock::Points(_) => match collect_variant!(blocks, AnyBlock::Points) {
                Some(typed) => Ok(AnyBlock::Points(PointBlock::stack(&typed)?)),
                None => Err(Self::unsupported("stack", blocks)),
            },
            AnyBlock::Line(_) => match collect_variant!(blocks, AnyBlock::Line) {
                Some(typed) => Ok(AnyBlock::Line(LineBlock::stack(&typed)?)),
                None => Err(Self::unsupported("stack", blocks)),
            },
            AnyBlock::Image(_) => match collect_variant!(blocks, AnyBlock::Image) {
                Some(typed) => Ok(AnyBlock::Image(ImageBlock::stack(&typed)?)),
                None => Err(Self::unsupported("stack", blocks)),
            },
            AnyBlock::Orientations(_)
            | AnyBlock::Sphere(_)
            | AnyBlock::Properties(_)
            | AnyBlock::Particles(_) => Err(Self::unsupported("stack", blocks)),
        }
    }
}

impl Block for AnyBlock {
    fn core(&self) -> &BlockCore {
        match self {
            AnyBlock::Points(block) => block.core(),
            AnyBlock::Line(block) => block.core(),
            AnyBlock::Orientations(block) => block.core(),
            AnyBlock::Image(block) => block.core(),
            AnyBlock::Sphere(block) => block.core(),
            AnyBlock::Properties(block) => block.core(),
            AnyBlock::Particles(block) => block.core(),
        }
    }

    fn core_mut(&mut self) -> &mut BlockCore {
        match self {
            AnyBlock::Points(block) => block.core_mut(),
            AnyBlock::Line(block) => block.core_mut(),
            AnyBlock::Orientations(block) => block.core_mut(),
            AnyBlock::Image(block) => block.core_mut(),
            AnyBlock::Sphere(block) => block.core_mut(),
            AnyBlock::Properties(block) => block.core_mut(),
            AnyBlock::Particles(block) => block.core_mut(),
        }
    }
}

impl fmt::Display for AnyBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyBlock::Points(block) => write!(
                f,
                "PointBlock[{}]({}, {})",
                block.name(),
                block.len(),
                block.ndim_spatial()
            ),
            AnyBlock::Line(block) => write!(
                f,
                "LineBlock[{}]({}, {})",
                block.name(),
                block.len(),
                block.ndim_spatial()
            ),
            AnyBlock::Orientations(block) => write!(
                f,
                "OrientationBlock[{}]({}, {d}, {d})",
                block.name(),
                block.len(),
                d = block.ndim_spatial()
            ),
            AnyBlock::Image(block) => match block.peek() {
                Some(data) => write!(f, "ImageBlock[{}]{:?}", block.name(), data.shape()),
                None => write!(f, "ImageBlock[{}](deferred)", block.name()),
            },
            AnyBlock::Sphere(block) => {
                write!(f, "SphereBlock[{}](r={})", block.name(), block.radius())
            }
            AnyBlock::Properties(block) => write!(
                f,
                "PropertyBlock[{}]({}x{})",
                block.name(),
                block.len(),
                block.names().len()
            ),
            AnyBlock::Particles(block) => {
                write!(f, "ParticleBlock[{}]({})", block.name(), block.len())
            }
        }
    }
}

impl From<PointBlock> for AnyBlock {
    fn from(block: PointBlock) -> Self {
        AnyBlock::Points(block)
    }
}

impl From<LineBlock> for AnyBlock {
    fn from(block: LineBlock) -> Self {
        AnyBlock::Line(block)
    }
}

impl From<OrientationBlock> for AnyBlock {
    fn from(block: OrientationBlock) -> Self {
        AnyBlock::Orientations(block)
    }
}

impl From<ImageBlock> for AnyBlock {
    fn from(block: ImageBlock) -> Self {
        AnyBlock::Image(block)
    }
}

impl From<SphereBlock> for AnyBlock {
    fn from(block: SphereBlock) -> Self {
        AnyBlock::Sphere(block)
    }
}

impl From<PropertyBlock> for AnyBlock {
    fn from(block: PropertyBlock) -> Self {
        AnyBlock::Properties(block)
    }
}

impl From<ParticleBlock> for AnyBlock {
    fn from(block: ParticleBlock) -> Self {
        AnyBlock::Particles(block)
    }
}

/// An ordered collection of blocks sharing one coordinate frame
#[derive(Debug)]
pub struct DataCrate {
    id: BlockId,
    name: String,
    blocks: Vec<AnyBlock>,
}

impl DataCrate {
    pub fn new() -> Self {
        Self {
            id: BlockId::new(),
            name: UNNAMED.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AnyBlock> {
        self.blocks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut AnyBlock> {
        self.blocks.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnyBlock> {
        self.blocks.iter()
    }

    /// Append one block, stamping this crate as its parent.
    pub fn push(&mut self, block: impl Into<AnyBlock>) {
        let mut block = block.into();
        block.core_mut().set_parent(Some(self.id));
        self.blocks.push(block);
    }

    /// Concatenate. The right-hand side is anything convertible into a
    /// crate; a bare block wraps into a singleton crate first.
    pub fn concat(mut self, other: impl Into<DataCrate>) -> DataCrate {
        self.append(other);
        self
    }

    /// Extend in place with the members of `other`, re-stamping their
    /// parent back-links. Member payloads are never touched.
    pub fn append(&mut self, other: impl Into<DataCrate>) {
        let other = other.into();
        for mut block in other.blocks {
            block.core_mut().set_parent(Some(self.id));
            self.blocks.push(block);
        }
    }
}

impl Default for DataCrate {
    fn default() -> Self {
        Self::new()
    }
}

impl From<AnyBlock> for DataCrate {
    fn from(block: AnyBlock) -> Self {
        let mut singleton = DataCrate::new();
        singleton.push(block);
        singleton
    }
}

impl From<PointBlock> for DataCrate {
    fn from(block: PointBlock) -> Self {
        DataCrate::from(AnyBlock::from(block))
    }
}

impl From<LineBlock> for DataCrate {
    fn from(block: LineBlock) -> Self {
        DataCrate::from(AnyBlock::from(block))
    }
}

impl From<OrientationBlock> for DataCrate {
    fn from(block: OrientationBlock) -> Self {
        DataCrate::from(AnyBlock::from(block))
    }
}

impl From<ImageBlock> for DataCrate {
    fn from(block: ImageBlock) -> Self {
        DataCrate::from(AnyBlock::from(block))
    }
}

impl From<SphereBlock> for DataCrate {
    fn from(block: SphereBlock) -> Self {
        DataCrate::from(AnyBlock::from(block))
    }
}

impl From<PropertyBlock> for DataCrate {
    fn from(block: PropertyBlock) -> Self {
        DataCrate::from(AnyBlock::from(block))
    }
}

impl From<ParticleBlock> for DataCrate {
    fn from(block: ParticleBlock) -> Self {
        DataCrate::from(AnyBlock::from(block))
    }
}

impl From<Vec<AnyBlock>> for DataCrate {
    fn from(blocks: Vec<AnyBlock>) -> Self {
        let mut collected = DataCrate::new();
        for block in blocks {
            collected.push(block);
        }
        collected
    }
}

/// Crates of crates flatten into one flat sequence.
impl From<Vec<DataCrate>> for DataCrate {
    fn from(crates: Vec<DataCrate>) -> Self {
        let mut flat = DataCrate::new();
        for nested in crates {
            flat.append(nested);
        }
        flat
    }
}

impl FromIterator<AnyBlock> for DataCrate {
    fn from_iter<I: IntoIterator<Item = AnyBlock>>(iter: I) -> Self {
        let mut collected = DataCrate::new();
        for block in iter {
            collected.push(block);
        }
        collected
    }
}

impl IntoIterator for DataCrate {
    type Item = AnyBlock;
    type IntoIter = std::vec::IntoIter<AnyBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.into_iter()
    }
}

impl<'a> IntoIterator for &'a DataCrate {
    type Item = &'a AnyBlock;
    type IntoIter = std::slice::Iter<'a, AnyBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

impl std::ops::Index<usize> for DataCrate {
    type Output = AnyBlock;

    fn index(&self, index: usize) -> &AnyBlock {
        &self.blocks[index]
    }
}

impl fmt::Display for DataCrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self.blocks.iter().map(AnyBlock::to_string).collect();
        write!(
            f,
            "DataCrate[{}]({}): [{}]",
            self.name,
            self.len(),
            members.join(", ")
        )
    }
}
