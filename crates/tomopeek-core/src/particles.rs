//! Particle sets
//!
//! A [`ParticleBlock`] unites positions, orientations and per-particle
//! properties into one composite entity. Children are registered at
//! construction in a fixed order (positions, orientations, properties) and
//! composition applies per child position: merging particle sets merges
//! each aligned child independently and reassembles the result.

use crate::block::{Block, BlockCore, BlockId};
use crate::combine::{ensure_nonempty, Merge};
use crate::error::{BlockError, BlockResult, CombineResult};
use crate::orientations::OrientationBlock;
use crate::points::PointBlock;
use crate::properties::PropertyBlock;

/// An ordered aggregate of simple blocks forming one composite entity
pub trait MultiBlock: Block {
    /// Child blocks in registration order.
    fn children(&self) -> Vec<&dyn Block>;
}

/// Particles: positions + orientations + per-particle properties
#[derive(Debug)]
pub struct ParticleBlock {
    core: BlockCore,
    positions: PointBlock,
    orientations: OrientationBlock,
    properties: PropertyBlock,
}

impl ParticleBlock {
    /// Assemble a particle set. All children must agree on the particle
    /// count; a property table with no columns matches any count.
    pub fn new(
        positions: PointBlock,
        orientations: OrientationBlock,
        properties: PropertyBlock,
    ) -> BlockResult<Self> {
        if positions.len() != orientations.len()
            || (!properties.is_empty() && properties.len() != positions.len())
        {
            return Err(BlockError::ParticleCount {
                counts: vec![positions.len(), orientations.len(), properties.len()],
            });
        }

        let mut block = Self {
            core: BlockCore::unnamed(),
            positions,
            orientations,
            properties,
        };
        block.register_children();
        Ok(block)
    }

    pub fn with_name(
        positions: PointBlock,
        orientations: OrientationBlock,
        properties: PropertyBlock,
        name: impl Into<String>,
    ) -> BlockResult<Self> {
        let mut block = Self::new(positions, orientations, properties)?;
        block.core.set_name(name);
        Ok(block)
    }

    fn register_children(&mut self) {
        let parent: Option<BlockId> = Some(self.core.id());
        self.positions.core_mut().set_parent(parent);
        self.orientations.core_mut().set_parent(parent);
        self.properties.core_mut().set_parent(parent);
    }

    pub fn positions(&self) -> &PointBlock {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut PointBlock {
        &mut self.positions
    }

    pub fn orientations(&self) -> &OrientationBlock {
        &self.orientations
    }

    pub fn orientations_mut(&mut self) -> &mut OrientationBlock {
        &mut self.orientations
    }

    pub fn properties(&self) -> &PropertyBlock {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyBlock {
        &mut self.properties
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A fresh-identity particle set holding one particle, selected across
    /// every child.
    pub fn select(&self, index: usize) -> BlockResult<ParticleBlock> {
        let properties = if self.properties.is_empty() {
            PropertyBlock::empty(1)
        } else {
            self.properties.select(index)?
        };
        ParticleBlock::new(
            self.positions.select(index)?,
            self.orientations.select(index)?,
            properties,
        )
    }
}

impl Block for ParticleBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BlockCore {
        &mut self.core
    }
}

impl MultiBlock for ParticleBlock {
    fn children(&self) -> Vec<&dyn Block> {
        vec![&self.positions, &self.orientations, &self.properties]
    }
}

impl Merge for ParticleBlock {
    /// Merge each aligned child position independently and reassemble.
    fn merge(blocks: &[&Self]) -> CombineResult<Self> {
        ensure_nonempty(blocks, "merge")?;

        let positions: Vec<&PointBlock> = blocks.iter().map(|b| &b.positions).collect();
        let orientations: Vec<&OrientationBlock> =
            blocks.iter().map(|b| &b.orientations).collect();
        let properties: Vec<&PropertyBlock> = blocks.iter().map(|b| &b.properties).collect();

        Ok(ParticleBlock::new(
            PointBlock::merge(&positions)?,
            OrientationBlock::merge(&orientations)?,
            PropertyBlock::merge(&properties)?,
        )?)
    }

    fn merge_with(&mut self, others: &[&Self]) -> CombineResult<()> {
        ensure_nonempty(others, "merge")?;

        let positions: Vec<&PointBlock> = others.iter().map(|b| &b.positions).collect();
        self.positions.merge_with(&positions)?;

        let orientations: Vec<&OrientationBlock> =
            others.iter().map(|b| &b.orientations).collect();
        self.orientations.merge_with(&orientations)?;

        let properties: Vec<&PropertyBlock> = others.iter().map(|b| &b.properties).collect();
        self.properties.merge_with(&properties)?;

        self.core.notify();
        Ok(())
    }
}
