//! Spheres
//!
//! A [`SphereBlock`] models a spherical shell (vesicle, capsid) as a
//! 3-vector center plus a scalar radius. The radius can alternatively be
//! derived from a point on the sphere's edge; re-assigning the edge point
//! recomputes and overwrites the radius.

use ndarray::{Array1, ArrayD};

use crate::block::{Block, BlockCore};
use crate::error::{BlockError, BlockResult};

/// Flatten any input down to exactly three components.
fn flatten_vec3(raw: &ArrayD<f64>) -> BlockResult<Array1<f64>> {
    let flat: Vec<f64> = raw.iter().copied().collect();
    if flat.len() != 3 {
        return Err(BlockError::CenterLength { len: flat.len() });
    }
    Ok(Array1::from(flat))
}

fn validate_radius(value: f64) -> BlockResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(BlockError::Radius { value })
    }
}

fn euclidean(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    (a - b).mapv(|v| v * v).sum().sqrt()
}

/// A sphere described by center and radius
#[derive(Debug)]
pub struct SphereBlock {
    core: BlockCore,
    center: Array1<f64>,
    radius: f64,
    edge_point: Option<Array1<f64>>,
}

impl SphereBlock {
    pub fn new(center: &ArrayD<f64>, radius: f64) -> BlockResult<Self> {
        Ok(Self {
            core: BlockCore::unnamed(),
            center: flatten_vec3(center)?,
            radius: validate_radius(radius)?,
            edge_point: None,
        })
    }

    pub fn with_name(center: &ArrayD<f64>, radius: f64, name: impl Into<String>) -> BlockResult<Self> {
        let mut block = Self::new(center, radius)?;
        block.core.set_name(name);
        Ok(block)
    }

    /// Derive the radius from a point on the sphere's edge.
    pub fn from_edge_point(center: &ArrayD<f64>, edge_point: &ArrayD<f64>) -> BlockResult<Self> {
        let center = flatten_vec3(center)?;
        let edge = flatten_vec3(edge_point)?;
        let radius = euclidean(&center, &edge);
        Ok(Self {
            core: BlockCore::unnamed(),
            center,
            radius,
            edge_point: Some(edge),
        })
    }

    pub fn center(&self) -> &Array1<f64> {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn edge_point(&self) -> Option<&Array1<f64>> {
        self.edge_point.as_ref()
    }

    /// Replace the center and notify the consumer. The radius is left as it
    /// is; only edge-point assignment recomputes it.
    pub fn set_center(&mut self, center: &ArrayD<f64>) -> BlockResult<()> {
        self.center = flatten_vec3(center)?;
        self.core.notify();
        Ok(())
    }

    pub fn set_radius(&mut self, radius: f64) -> BlockResult<()> {
        self.radius = validate_radius(radius)?;
        self.core.notify();
        Ok(())
    }

    /// Replace the edge point; recomputes the radius as the Euclidean
    /// distance to the center, overwriting any previously set value, and
    /// notifies the consumer.
    pub fn set_edge_point(&mut self, edge_point: &ArrayD<f64>) -> BlockResult<()> {
        let edge = flatten_vec3(edge_point)?;
        self.radius = euclidean(&self.center, &edge);
        self.edge_point = Some(edge);
        self.core.notify();
        Ok(())
    }
}

impl Block for SphereBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BlockCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_center_flattens_to_three_components() {
        // a (1, 3) row vector reduces to a flat 3-vector
        let block = SphereBlock::new(&array![[1.0, 2.0, 3.0]].into_dyn(), 5.0).unwrap();
        assert_eq!(block.center(), &array![1.0, 2.0, 3.0]);
        assert_eq!(block.radius(), 5.0);
    }

    #[test]
    fn test_wrong_center_length_is_rejected() {
        assert!(matches!(
            SphereBlock::new(&array![1.0, 2.0].into_dyn(), 1.0),
            Err(BlockError::CenterLength { len: 2 })
        ));
        assert!(SphereBlock::new(&array![1.0, 2.0, 3.0, 4.0].into_dyn(), 1.0).is_err());
    }

    #[test]
    fn test_negative_radius_is_rejected() {
        assert!(matches!(
            SphereBlock::new(&array![0.0, 0.0, 0.0].into_dyn(), -2.0),
            Err(BlockError::Radius { .. })
        ));
    }

    #[test]
    fn test_radius_from_edge_point() {
        let block = SphereBlock::from_edge_point(
            &array![0.0, 0.0, 0.0].into_dyn(),
            &array![3.0, 4.0, 0.0].into_dyn(),
        )
        .unwrap();
        assert_eq!(block.radius(), 5.0);
        assert_eq!(block.edge_point().unwrap(), &array![3.0, 4.0, 0.0]);
    }

    #[test]
    fn test_edge_point_assignment_overwrites_radius() {
        let mut block = SphereBlock::new(&array![0.0, 0.0, 0.0].into_dyn(), 100.0).unwrap();
        block
            .set_edge_point(&array![0.0, 0.0, 2.0].into_dyn())
            .unwrap();
        assert_eq!(block.radius(), 2.0);
    }

    #[test]
    fn test_set_center_keeps_radius() {
        let mut block = SphereBlock::new(&array![0.0, 0.0, 0.0].into_dyn(), 7.0).unwrap();
        block.set_center(&array![1.0, 1.0, 1.0].into_dyn()).unwrap();
        assert_eq!(block.radius(), 7.0);
    }
}
