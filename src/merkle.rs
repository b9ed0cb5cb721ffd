use crate::error::MerkleError;
use crate::hash::{hash_one, hash_one_element, hash_two};
use crate::util::log2_exact;
use crate::Hash;
use ark_ff::Field;
use digest::Digest;
use log::debug;
use rayon::prelude::*;
use std::fmt;

/// How a matrix is cut into leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafLayout {
    /// leaf `k` holds column `k`
    Columns,
    /// leaf `k` holds row `k`
    Rows,
}

/// Binary Merkle tree stored as a heap: the root sits at index 0 and leaf `i`
/// at index `leaf_count - 1 + i`.
pub struct MerkleTree<D: Digest, F: Field> {
    leaves: Vec<Vec<F>>,
    nodes: Vec<Hash<D>>,
    depth: usize,
}

impl<D: Digest, F: Field> MerkleTree<D, F> {
    pub fn commit(matrix: &[Vec<F>], layout: LeafLayout) -> Result<Self, MerkleError> {
        let width = match matrix.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(MerkleError::EmptyMatrix),
        };
        if let Some(row) = matrix.iter().position(|row| row.len() != width) {
            return Err(MerkleError::RaggedMatrix { row });
        }

        let leaves = match layout {
            LeafLayout::Rows => matrix.to_vec(),
            LeafLayout::Columns => (0..width)
                .into_par_iter()
                .map(|column| matrix.iter().map(|row| row[column]).collect())
                .collect(),
        };
        Self::from_leaves(leaves)
    }

    /// Commits to a vector with one element per leaf.
    pub fn commit_vector(values: &[F]) -> Result<Self, MerkleError> {
        let leaves = values.iter().map(|value| vec![*value]).collect::<Vec<_>>();
        let mut tree = Self::allocate(leaves)?;
        let offset = tree.leaves.len() - 1;
        tree.nodes[offset..]
            .par_iter_mut()
            .zip(values.par_iter())
            .for_each(|(node, value)| *node = hash_one_element::<D, F>(value));
        tree.build_levels();
        Ok(tree)
    }

    pub fn from_leaves(leaves: Vec<Vec<F>>) -> Result<Self, MerkleError> {
        let mut tree = Self::allocate(leaves)?;
        let offset = tree.leaves.len() - 1;
        tree.nodes[offset..]
            .par_iter_mut()
            .zip(tree.leaves.par_iter())
            .for_each(|(node, leaf)| *node = hash_one::<D, F>(leaf));
        tree.build_levels();
        Ok(tree)
    }

    fn allocate(leaves: Vec<Vec<F>>) -> Result<Self, MerkleError> {
        let leaf_count = leaves.len();
        let depth = log2_exact(leaf_count).ok_or(MerkleError::LeafCountNotPowerOfTwo {
            leaves: leaf_count,
        })?;
        let width = leaves[0].len();
        if width == 0 {
            return Err(MerkleError::EmptyMatrix);
        }
        if let Some(row) = leaves.iter().position(|leaf| leaf.len() != width) {
            return Err(MerkleError::RaggedMatrix { row });
        }

        debug!("allocating merkle tree with {leaf_count} leaves of width {width}");
        Ok(Self {
            leaves,
            nodes: vec![Hash::<D>::default(); 2 * leaf_count - 1],
            depth,
        })
    }

    fn build_levels(&mut self) {
        for level in (0..self.depth).rev() {
            let start = (1 << level) - 1;
            let (upper, lower) = self.nodes.split_at_mut((1 << (level + 1)) - 1);
            upper[start..]
                .par_iter_mut()
                .zip(lower[..2 << level].par_chunks(2))
                .for_each(|(parent, children)| {
                    *parent = hash_two::<D>(&children[0], &children[1])
                });
        }
    }

    pub fn root(&self) -> MerkleRoot<D> {
        MerkleRoot(self.nodes[0].clone())
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn leaf_width(&self) -> usize {
        self.leaves[0].len()
    }

    pub fn leaf(&self, index: usize) -> Option<&[F]> {
        self.leaves.get(index).map(Vec::as_slice)
    }

    pub fn open(&self, index: usize) -> Result<MerkleOpening<D, F>, MerkleError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleError::QueryOutOfRange {
                index,
                leaves: leaf_count,
            });
        }

        let mut path = Vec::with_capacity(self.depth);
        let mut node = leaf_count - 1 + index;
        while node > 0 {
            // left children sit at odd heap positions
            let sibling = if node % 2 == 1 { node + 1 } else { node - 1 };
            path.push(self.nodes[sibling].clone());
            node = (node - 1) / 2;
        }

        Ok(MerkleOpening {
            index,
            values: self.leaves[index].clone(),
            path,
        })
    }

    pub fn open_many(&self, indices: &[usize]) -> Result<Vec<MerkleOpening<D, F>>, MerkleError> {
        indices.par_iter().map(|index| self.open(*index)).collect()
    }
}

/// A leaf together with its authentication path, ordered leaf to root.
pub struct MerkleOpening<D: Digest, F: Field> {
    pub index: usize,
    pub values: Vec<F>,
    pub path: Vec<Hash<D>>,
}

impl<D: Digest, F: Field> Clone for MerkleOpening<D, F> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            values: self.values.clone(),
            path: self.path.clone(),
        }
    }
}

impl<D: Digest, F: Field> fmt::Debug for MerkleOpening<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleOpening")
            .field("index", &self.index)
            .field("values", &self.values)
            .field("path_length", &self.path.len())
            .finish()
    }
}

pub struct MerkleRoot<D: Digest>(pub Hash<D>);

impl<D: Digest> MerkleRoot<D> {
    /// Recomputes the root from an opening. The bit `j` of the leaf index says
    /// whether the running digest is the right child at level `j`.
    pub fn verify<F: Field>(
        &self,
        opening: &MerkleOpening<D, F>,
        leaf_width: usize,
        depth: usize,
    ) -> bool {
        if opening.path.len() != depth || opening.values.len() != leaf_width {
            return false;
        }
        if opening.index.checked_shr(depth as u32).unwrap_or(0) != 0 {
            return false;
        }

        let mut current = hash_one::<D, F>(&opening.values);
        let mut index = opening.index;
        for sibling in &opening.path {
            current = if index & 1 == 0 {
                hash_two::<D>(&current, sibling)
            } else {
                hash_two::<D>(sibling, &current)
            };
            index >>= 1;
        }

        current == self.0
    }
}

impl<D: Digest> Clone for MerkleRoot<D> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<D: Digest> PartialEq for MerkleRoot<D> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<D: Digest> Eq for MerkleRoot<D> {}

impl<D: Digest> fmt::Debug for MerkleRoot<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MerkleRoot(")?;
        for byte in self.0.iter() {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// A root together with the openings of a query set, as sent to a verifier.
pub struct MerkleTreeParameter<D: Digest, F: Field> {
    root: MerkleRoot<D>,
    leaf_count: usize,
    leaf_width: usize,
    queries: Vec<usize>,
    openings: Vec<MerkleOpening<D, F>>,
}

impl<D: Digest, F: Field> MerkleTreeParameter<D, F> {
    pub fn create(
        matrix: &[Vec<F>],
        queries: &[usize],
        layout: LeafLayout,
    ) -> Result<Self, MerkleError> {
        let tree = MerkleTree::<D, F>::commit(matrix, layout)?;
        Self::from_tree(&tree, queries)
    }

    pub fn create_of_vector(values: &[F], queries: &[usize]) -> Result<Self, MerkleError> {
        let tree = MerkleTree::<D, F>::commit_vector(values)?;
        Self::from_tree(&tree, queries)
    }

    pub fn from_tree(tree: &MerkleTree<D, F>, queries: &[usize]) -> Result<Self, MerkleError> {
        Ok(Self {
            root: tree.root(),
            leaf_count: tree.leaf_count(),
            leaf_width: tree.leaf_width(),
            queries: queries.to_vec(),
            openings: tree.open_many(queries)?,
        })
    }

    pub fn root(&self) -> &MerkleRoot<D> {
        &self.root
    }

    pub fn queries(&self) -> &[usize] {
        &self.queries
    }

    pub fn openings(&self) -> &[MerkleOpening<D, F>] {
        &self.openings
    }

    pub fn leaf_width(&self) -> usize {
        self.leaf_width
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Checks every opening against the embedded root and shape.
    pub fn verify(&self) -> bool {
        match log2_exact(self.leaf_count) {
            Some(depth) => self.verify_against(&self.root, self.leaf_width, depth),
            None => false,
        }
    }

    /// Checks every opening against a root and shape the verifier already trusts.
    pub fn verify_against(&self, root: &MerkleRoot<D>, leaf_width: usize, depth: usize) -> bool {
        if self.root != *root || self.queries.len() != self.openings.len() {
            return false;
        }
        self.queries
            .par_iter()
            .zip(self.openings.par_iter())
            .all(|(query, opening)| {
                opening.index == *query && root.verify(opening, leaf_width, depth)
            })
    }

    /// Total number of digests carried by the authentication paths.
    pub fn path_length(&self) -> usize {
        self.openings.iter().map(|opening| opening.path.len()).sum()
    }

    pub fn num_field_elements(&self) -> usize {
        self.openings.iter().map(|opening| opening.values.len()).sum()
    }
}

impl<D: Digest, F: Field> Clone for MerkleTreeParameter<D, F> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            leaf_count: self.leaf_count,
            leaf_width: self.leaf_width,
            queries: self.queries.clone(),
            openings: self.openings.clone(),
        }
    }
}
