//! Per-entity scalar properties
//!
//! A [`PropertyBlock`] is an ordered name-to-column mapping of per-entity
//! scalar values (classification scores, cross-correlation, subset labels),
//! aligned row-for-row with the positions and orientations of a particle
//! set. All columns share one length.

use std::collections::BTreeMap;

use ndarray::Array1;

use crate::block::{Block, BlockCore};
use crate::combine::{concat_entities, ensure_nonempty, Merge};
use crate::error::{BlockError, BlockResult, CombineError, CombineResult};

fn validate_columns(columns: &BTreeMap<String, Array1<f64>>) -> BlockResult<usize> {
    let lengths: Vec<usize> = columns.values().map(Array1::len).collect();
    let len = lengths.first().copied().unwrap_or(0);
    if lengths.iter().any(|&l| l != len) {
        return Err(BlockError::PropertyLength { lengths });
    }
    Ok(len)
}

/// A name-to-column table of per-entity scalar properties
#[derive(Debug)]
pub struct PropertyBlock {
    core: BlockCore,
    columns: BTreeMap<String, Array1<f64>>,
    len: usize,
}

impl PropertyBlock {
    pub fn new(columns: BTreeMap<String, Array1<f64>>) -> BlockResult<Self> {
        let len = validate_columns(&columns)?;
        Ok(Self {
            core: BlockCore::unnamed(),
            columns,
            len,
        })
    }

    /// A table with no columns for n entities.
    pub fn empty(len: usize) -> Self {
        Self {
            core: BlockCore::unnamed(),
            columns: BTreeMap::new(),
            len,
        }
    }

    pub fn with_name(
        columns: BTreeMap<String, Array1<f64>>,
        name: impl Into<String>,
    ) -> BlockResult<Self> {
        let mut block = Self::new(columns)?;
        block.core.set_name(name);
        Ok(block)
    }

    pub fn data(&self) -> &BTreeMap<String, Array1<f64>> {
        &self.columns
    }

    /// Replace the whole table through the validator and notify.
    pub fn set_data(&mut self, columns: BTreeMap<String, Array1<f64>>) -> BlockResult<()> {
        self.len = validate_columns(&columns)?;
        self.columns = columns;
        self.core.notify();
        Ok(())
    }

    /// Copy another property block's table without re-validating.
    pub fn set_data_from(&mut self, other: &PropertyBlock) {
        self.columns = other.columns.clone();
        self.len = other.len;
        self.core.notify();
    }

    pub fn column(&self, name: &str) -> Option<&Array1<f64>> {
        self.columns.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Add or replace one column; its length must match the table.
    pub fn insert_column(&mut self, name: impl Into<String>, column: Array1<f64>) -> BlockResult<()> {
        if !self.columns.is_empty() && column.len() != self.len {
            return Err(BlockError::PropertyLength {
                lengths: vec![self.len, column.len()],
            });
        }
        self.len = column.len();
        self.columns.insert(name.into(), column);
        self.core.notify();
        Ok(())
    }

    /// A like-typed, fresh-identity table holding one entity's values.
    pub fn select(&self, index: usize) -> BlockResult<PropertyBlock> {
        if index >= self.len {
            return Err(BlockError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| (name.clone(), Array1::from(vec![column[index]])))
            .collect();
        PropertyBlock::new(columns)
    }

    /// Overwrite one value in place and notify.
    pub fn set_value(&mut self, name: &str, index: usize, value: f64) -> BlockResult<()> {
        let len = self.len;
        let column = self
            .columns
            .get_mut(name)
            .ok_or_else(|| BlockError::UnknownProperty {
                name: name.to_string(),
            })?;
        if index >= len {
            return Err(BlockError::IndexOutOfRange { index, len });
        }
        column[index] = value;
        self.core.notify();
        Ok(())
    }
}

impl Block for PropertyBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BlockCore {
        &mut self.core
    }
}

fn check_key_alignment(blocks: &[&PropertyBlock]) -> CombineResult<()> {
    let lead: Vec<&str> = blocks[0].names();
    for block in blocks.iter().skip(1) {
        let names = block.names();
        if names != lead {
            return Err(CombineError::Misaligned {
                reason: format!("property keys differ: {:?} vs {:?}", lead, names),
            });
        }
    }
    Ok(())
}

impl Merge for PropertyBlock {
    /// Concatenate each column across the inputs; all inputs must carry the
    /// same key set.
    fn merge(blocks: &[&Self]) -> CombineResult<Self> {
        ensure_nonempty(blocks, "merge")?;
        check_key_alignment(blocks)?;

        let mut columns = BTreeMap::new();
        for name in blocks[0].columns.keys() {
            let parts: Vec<&Array1<f64>> = blocks
                .iter()
                .map(|block| &block.columns[name])
                .collect();
            columns.insert(name.clone(), concat_entities(&parts)?);
        }
        let mut merged = PropertyBlock::new(columns)?;
        if merged.columns.is_empty() {
            merged.len = blocks.iter().map(|block| block.len).sum();
        }
        Ok(merged)
    }

    fn merge_with(&mut self, others: &[&Self]) -> CombineResult<()> {
        ensure_nonempty(others, "merge")?;
        let mut all: Vec<&Self> = vec![&*self];
        all.extend(others.iter().copied());
        let merged = Self::merge(&all)?;
        self.len = merged.len;
        self.columns = merged.columns;
        self.core.notify();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn table(values: &[(&str, Vec<f64>)]) -> PropertyBlock {
        let columns = values
            .iter()
            .map(|(name, column)| (name.to_string(), Array1::from(column.clone())))
            .collect();
        PropertyBlock::new(columns).unwrap()
    }

    #[test]
    fn test_columns_must_share_one_length() {
        let mut columns = BTreeMap::new();
        columns.insert("score".to_string(), Array1::from(vec![1.0, 2.0]));
        columns.insert("class".to_string(), Array1::from(vec![1.0]));
        assert!(matches!(
            PropertyBlock::new(columns),
            Err(BlockError::PropertyLength { .. })
        ));
    }

    #[test]
    fn test_name_to_column_access() {
        let block = table(&[("score", vec![0.5, 0.9]), ("class", vec![1.0, 2.0])]);
        assert_eq!(block.len(), 2);
        assert_eq!(block.names(), vec!["class", "score"]);
        assert_eq!(block.column("score").unwrap(), &array![0.5, 0.9]);
        assert!(block.column("missing").is_none());
    }

    #[test]
    fn test_insert_column_validates_length() {
        let mut block = table(&[("score", vec![0.5, 0.9])]);
        assert!(block.insert_column("class", array![1.0]).is_err());
        block.insert_column("class", array![1.0, 2.0]).unwrap();
        assert_eq!(block.names().len(), 2);
    }

    #[test]
    fn test_select_single_entity() {
        let block = table(&[("score", vec![0.5, 0.9])]);
        let one = block.select(1).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one.column("score").unwrap(), &array![0.9]);
        assert!(block.select(2).is_err());
    }

    #[test]
    fn test_merge_concatenates_per_key() {
        let a = table(&[("score", vec![1.0, 2.0])]);
        let b = table(&[("score", vec![3.0])]);
        let merged = PropertyBlock::merge(&[&a, &b]).unwrap();
        assert_eq!(merged.column("score").unwrap(), &array![1.0, 2.0, 3.0]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_merge_rejects_key_misalignment() {
        let a = table(&[("score", vec![1.0])]);
        let b = table(&[("class", vec![1.0])]);
        assert!(matches!(
            PropertyBlock::merge(&[&a, &b]),
            Err(CombineError::Misaligned { .. })
        ));
    }

    #[test]
    fn test_set_value_checks_name_and_range() {
        let mut block = table(&[("score", vec![1.0, 2.0])]);
        block.set_value("score", 0, 9.0).unwrap();
        assert_eq!(block.column("score").unwrap()[0], 9.0);
        assert!(block.set_value("missing", 0, 1.0).is_err());
        assert!(block.set_value("score", 5, 1.0).is_err());
    }
}
