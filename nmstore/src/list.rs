//! List-of-lists sparse storage
//!
//! One ordered map per dimension: the outer map is keyed by the first index,
//! each nested map by the next, and the last level holds the values. Any
//! position not present reads as the storage's default value. Writing the
//! default removes the entry, and sub-lists that become empty are removed.
//! The one exception is a single-element slice, which holds its element
//! explicitly so that it always counts one stored element.

use std::collections::BTreeMap;

use nmstore_core::validation::{validate_coords, validate_shape};
use nmstore_core::{DType, Element, Result, Slice, Storage, StorageInfo, StorageType};

#[derive(Debug, Clone)]
enum ListNode<T> {
    Leaf(T),
    Branch(BTreeMap<usize, ListNode<T>>),
}

type List<T> = BTreeMap<usize, ListNode<T>>;

/// Sparse storage as nested ordered lists
#[derive(Debug, Clone)]
pub struct ListStorage<T: Element> {
    shape: Vec<usize>,
    default: T,
    root: List<T>,
}

impl<T: Element> ListStorage<T> {
    /// Create an empty storage where every position reads as `default`
    pub fn new(shape: &[usize], default: T) -> Result<Self> {
        validate_shape(shape)?;
        Ok(Self {
            shape: shape.to_vec(),
            default,
            root: BTreeMap::new(),
        })
    }

    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::new(shape, T::zero())
    }

    /// Value of every position that is not stored
    pub fn default_value(&self) -> T {
        self.default
    }

    /// Stored elements that differ from the default, in row-major order
    pub fn entries(&self) -> Vec<(Vec<usize>, T)> {
        let mut entries = Vec::with_capacity(self.element_count());
        let mut prefix = Vec::with_capacity(self.shape.len());
        collect_entries(&self.root, &mut prefix, &mut entries);
        entries.retain(|(_, value)| !value.same_bits(&self.default));
        entries
    }
}

/// Equal when shape, default and every non-default entry agree
impl<T: Element> PartialEq for ListStorage<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self.default.same_bits(&other.default)
            && self.entries() == other.entries()
    }
}

fn collect_entries<T: Copy>(
    list: &List<T>,
    prefix: &mut Vec<usize>,
    out: &mut Vec<(Vec<usize>, T)>,
) {
    for (&index, node) in list {
        prefix.push(index);
        match node {
            ListNode::Leaf(value) => out.push((prefix.clone(), *value)),
            ListNode::Branch(child) => collect_entries(child, prefix, out),
        }
        prefix.pop();
    }
}

fn count_leaves<T>(list: &List<T>) -> usize {
    list.values()
        .map(|node| match node {
            ListNode::Leaf(_) => 1,
            ListNode::Branch(child) => count_leaves(child),
        })
        .sum()
}

fn lookup<T: Copy>(list: &List<T>, coords: &[usize]) -> Option<T> {
    match coords {
        [last] => match list.get(last) {
            Some(ListNode::Leaf(value)) => Some(*value),
            _ => None,
        },
        [first, rest @ ..] => match list.get(first) {
            Some(ListNode::Branch(child)) => lookup(child, rest),
            _ => None,
        },
        [] => None,
    }
}

fn insert<T>(list: &mut List<T>, coords: &[usize], value: T) {
    match coords {
        [last] => {
            list.insert(*last, ListNode::Leaf(value));
        }
        [first, rest @ ..] => {
            let node = list
                .entry(*first)
                .or_insert_with(|| ListNode::Branch(BTreeMap::new()));
            if let ListNode::Branch(child) = node {
                insert(child, rest, value);
            }
        }
        [] => {}
    }
}

fn remove<T>(list: &mut List<T>, coords: &[usize]) {
    match coords {
        [last] => {
            list.remove(last);
        }
        [first, rest @ ..] => {
            let now_empty = match list.get_mut(first) {
                Some(ListNode::Branch(child)) => {
                    remove(child, rest);
                    child.is_empty()
                }
                _ => false,
            };
            if now_empty {
                list.remove(first);
            }
        }
        [] => {}
    }
}

/// Copy the part of `list` inside the region, rebasing indices to zero
fn copy_region<T: Copy>(list: &List<T>, coords: &[usize], lengths: &[usize]) -> List<T> {
    let mut out = BTreeMap::new();
    let (Some(&start), Some(&length)) = (coords.first(), lengths.first()) else {
        return out;
    };

    for (&index, node) in list.range(start..start + length) {
        match node {
            ListNode::Leaf(value) => {
                out.insert(index - start, ListNode::Leaf(*value));
            }
            ListNode::Branch(child) => {
                let sub = copy_region(child, &coords[1..], &lengths[1..]);
                if !sub.is_empty() {
                    out.insert(index - start, ListNode::Branch(sub));
                }
            }
        }
    }
    out
}

impl<T: Element> StorageInfo for ListStorage<T> {
    fn dtype(&self) -> DType {
        T::DTYPE
    }

    fn stype(&self) -> StorageType {
        StorageType::List
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn element_count(&self) -> usize {
        count_leaves(&self.root)
    }
}

impl<T: Element> Storage for ListStorage<T> {
    type Element = T;

    fn get(&self, coords: &[usize]) -> Result<T> {
        validate_coords(coords, &self.shape)?;
        Ok(lookup(&self.root, coords).unwrap_or(self.default))
    }

    fn set(&mut self, coords: &[usize], value: T) -> Result<()> {
        validate_coords(coords, &self.shape)?;
        if value.same_bits(&self.default) {
            remove(&mut self.root, coords);
        } else {
            insert(&mut self.root, coords, value);
        }
        Ok(())
    }

    /// A single-element slice stores its element explicitly, even when it
    /// equals the default, so the result always holds exactly one element
    fn get_slice(&self, slice: &Slice) -> Result<Self> {
        slice.validate(&self.shape)?;

        let root = if slice.is_single() {
            let mut root = BTreeMap::new();
            insert(&mut root, &vec![0; slice.rank()], self.get(slice.coords())?);
            root
        } else {
            copy_region(&self.root, slice.coords(), slice.lengths())
        };

        Ok(Self {
            shape: slice.lengths().to_vec(),
            default: self.default,
            root,
        })
    }
}
