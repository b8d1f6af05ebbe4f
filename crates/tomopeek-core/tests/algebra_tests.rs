//! Composition algebra integration tests
//!
//! Exercises merge/stack across block variants, the heterogeneous dispatch
//! layer, and crate concatenation through the public API only.

use std::collections::BTreeMap;

use ndarray::{array, Array1, Array2, Array3, ArrayD, IxDyn};
use proptest::prelude::*;

use tomopeek_core::{
    AnyBlock, Block, CombineError, DataCrate, ImageBlock, LineBlock, Merge, OrientationBlock,
    ParticleBlock, PointBlock, PropertyBlock, Stack,
};

fn identity_matrices(n: usize) -> OrientationBlock {
    let mut data = Array3::<f64>::zeros((n, 3, 3));
    for i in 0..n {
        for j in 0..3 {
            data[[i, j, j]] = 1.0;
        }
    }
    OrientationBlock::new(data.into_dyn()).unwrap()
}

fn particle_set(n: usize) -> ParticleBlock {
    let positions = Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f64);
    let mut columns = BTreeMap::new();
    columns.insert(
        "score".to_string(),
        Array1::from_iter((0..n).map(|i| i as f64)),
    );
    ParticleBlock::new(
        PointBlock::new(positions.into_dyn()).unwrap(),
        identity_matrices(n),
        PropertyBlock::new(columns).unwrap(),
    )
    .unwrap()
}

// === Merge ===

#[test]
fn test_merge_preserves_input_order_across_variants() {
    let a = PointBlock::new(array![[1.0, 1.0, 1.0]].into_dyn()).unwrap();
    let b = PointBlock::new(array![[2.0, 2.0, 2.0], [3.0, 3.0, 3.0]].into_dyn()).unwrap();
    let merged = PointBlock::merge(&[&a, &b]).unwrap();

    assert_eq!(merged.data().shape(), &[3, 3]);
    assert_eq!(merged.data().row(0), array![1.0, 1.0, 1.0]);
    assert_eq!(merged.data().row(2), array![3.0, 3.0, 3.0]);
}

#[test]
fn test_particle_merge_is_pairwise_per_child() {
    let merged = ParticleBlock::merge(&[&particle_set(2), &particle_set(3)]).unwrap();

    assert_eq!(merged.len(), 5);
    assert_eq!(merged.positions().len(), 5);
    assert_eq!(merged.orientations().len(), 5);
    assert_eq!(merged.properties().column("score").unwrap().len(), 5);
    // second operand's first particle follows the first operand's last
    assert_eq!(merged.properties().column("score").unwrap()[2], 0.0);
}

// === Stack ===

#[test]
fn test_stack_embeds_lower_dimensional_points_into_trailing_slots() {
    let flat = PointBlock::new(array![[7.0, 8.0]].into_dyn()).unwrap();
    let deep = PointBlock::new(array![[1.0, 2.0, 3.0]].into_dyn()).unwrap();
    let stacked = PointBlock::stack(&[&flat, &deep]).unwrap();

    // leading index column, then right-aligned coordinates
    assert_eq!(stacked.data().row(0), array![0.0, 0.0, 7.0, 8.0]);
    assert_eq!(stacked.data().row(1), array![1.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_stack_zero_pads_mismatched_image_ranks() {
    let plane = ImageBlock::new(ArrayD::from_elem(IxDyn(&[4, 4]), 1.0), 2, 1.0).unwrap();
    let volume = ImageBlock::new(ArrayD::zeros(IxDyn(&[2, 4, 4])), 3, 1.0).unwrap();
    let mut stacked = ImageBlock::stack(&[&plane, &volume]).unwrap();

    let data = stacked.data().unwrap();
    assert_eq!(data.shape(), &[2, 2, 4, 4]);
    assert_eq!(data[[0, 0, 0, 0]], 1.0);
    assert_eq!(data[[0, 1, 0, 0]], 0.0);
}

// === Sentinel outcomes ===

#[test]
fn test_mixed_variant_merge_declines_rather_than_panics() {
    let points = AnyBlock::from(PointBlock::new(array![[0.0, 0.0]].into_dyn()).unwrap());
    let line = AnyBlock::from(LineBlock::new(array![[0.0, 0.0]].into_dyn()).unwrap());

    // a line is not a point set, even with an identical payload contract
    let outcome = AnyBlock::merge(&[&points, &line]);
    assert!(matches!(
        outcome,
        Err(CombineError::Unsupported {
            op: "merge",
            lhs: "points",
            rhs: "line",
        })
    ));
}

#[test]
fn test_particle_stack_propagates_the_children_sentinel() {
    let a = AnyBlock::from(particle_set(2));
    let b = AnyBlock::from(particle_set(2));
    assert!(matches!(
        AnyBlock::stack(&[&a, &b]),
        Err(CombineError::Unsupported { op: "stack", .. })
    ));
}

#[test]
fn test_empty_operand_sets_are_rejected() {
    assert!(matches!(
        AnyBlock::merge(&[]),
        Err(CombineError::Empty { op: "merge" })
    ));
    assert!(matches!(
        AnyBlock::stack(&[]),
        Err(CombineError::Empty { op: "stack" })
    ));
}

// === Crates ===

#[test]
fn test_crate_concat_with_bare_block_extends_by_one() {
    let mut holder = DataCrate::with_name("session");
    holder.push(particle_set(2));
    holder.push(ImageBlock::new(ArrayD::zeros(IxDyn(&[4, 4])), 2, 1.0).unwrap());
    let before = holder.len();

    let holder = holder.concat(PointBlock::new(array![[1.0, 2.0, 3.0]].into_dyn()).unwrap());
    assert_eq!(holder.len(), before + 1);
}

#[test]
fn test_crate_members_share_the_crate_as_parent() {
    let mut a = DataCrate::new();
    a.push(particle_set(1));
    let mut b = DataCrate::new();
    b.push(particle_set(2));

    let flat = DataCrate::from(vec![a, b]);
    assert_eq!(flat.len(), 2);
    for member in &flat {
        assert_eq!(member.parent(), Some(flat.id()));
    }
}

// === Properties over payload shapes ===

proptest! {
    #[test]
    fn merging_point_blocks_concatenates_entity_counts(
        a in 1usize..12,
        b in 1usize..12,
        m in 1usize..6,
    ) {
        let first = Array2::from_shape_fn((a, m), |(i, j)| (i * m + j) as f64);
        let second = Array2::from_shape_fn((b, m), |(i, j)| 1000.0 + (i * m + j) as f64);
        let first_block = PointBlock::new(first.clone().into_dyn()).unwrap();
        let second_block = PointBlock::new(second.clone().into_dyn()).unwrap();

        let merged = PointBlock::merge(&[&first_block, &second_block]).unwrap();
        prop_assert_eq!(merged.data().shape(), &[a + b, m]);
        prop_assert_eq!(merged.data().row(0), first.row(0));
        prop_assert_eq!(merged.data().row(a), second.row(0));
    }

    #[test]
    fn stacking_point_blocks_right_aligns_into_a_common_space(
        a in 1usize..8,
        b in 1usize..8,
        m1 in 1usize..5,
        m2 in 1usize..5,
    ) {
        let first = PointBlock::new(Array2::from_elem((a, m1), 1.0).into_dyn()).unwrap();
        let second = PointBlock::new(Array2::from_elem((b, m2), 2.0).into_dyn()).unwrap();

        let stacked = PointBlock::stack(&[&first, &second]).unwrap();
        let width = 1 + m1.max(m2);
        prop_assert_eq!(stacked.data().shape(), &[a + b, width]);
        // the leading coordinate column distinguishes the originals
        prop_assert_eq!(stacked.data()[[0, 0]], 0.0);
        prop_assert_eq!(stacked.data()[[a, 0]], 1.0);
        // original data sits in the trailing slots
        prop_assert_eq!(stacked.data()[[0, width - 1]], 1.0);
        prop_assert_eq!(stacked.data()[[a, width - 1]], 2.0);
    }
}
