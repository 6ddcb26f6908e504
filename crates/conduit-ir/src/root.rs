//! Compilation unit root.

use std::fmt;

use crate::operation::Operation;

/// An ordered sequence of operations forming one compilation unit.
///
/// Operations are intended to execute in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Root {
    children: Vec<Operation>,
}

impl Root {
    pub fn new(children: Vec<Operation>) -> Self {
        Self { children }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.children
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<'a> IntoIterator for &'a Root {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Operation> for Root {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Root:")?;
        for op in &self.children {
            write!(f, "\n\t{}", op)?;
        }
        Ok(())
    }
}
