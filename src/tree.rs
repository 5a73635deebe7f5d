//! Arena-based Huffman tree: builder, code assigner, and the decode-trie
//! reconstructor used on expansion.
//!
//! Grounded on `original_source/source/btree.c` for *what* a build and a
//! reconstruct must produce (`spec.md` §4.2/§4.7), but not on its
//! back-tracking state machine: `spec.md` §9 explicitly asks for the
//! canonical two-queue priority-merge algorithm instead, which reproduces
//! the same tie-break rule ("internal nodes win on a weight tie") without
//! the original's `count - 4` special-casing.
//!
//! Parent links are omitted per `spec.md` §9 — neither encoding nor
//! decoding ever walks upward through a reconstructed tree.

use std::collections::VecDeque;

use crate::symbols::Symbol;
use crate::Error;

/// One arena slot: either an internal node (both children set, `symbol`
/// unset) or a leaf (`symbol` set, both children unset).
#[derive(Clone, Copy, Debug)]
pub struct TreeNode {
    pub weight: u64,
    pub left: Option<u32>,
    pub right: Option<u32>,
    pub symbol: Option<u8>,
}

impl TreeNode {
    fn leaf(character: u8, weight: u64) -> Self {
        Self { weight, left: None, right: None, symbol: Some(character) }
    }
    fn internal(weight: u64, left: u32, right: u32) -> Self {
        Self { weight, left: Some(left), right: Some(right), symbol: None }
    }
    pub fn is_leaf(&self) -> bool {
        self.symbol.is_some()
    }
}

/// A built or reconstructed tree: an arena plus the index of its root.
pub struct Tree {
    pub arena: Vec<TreeNode>,
    pub root: u32,
}

/// `(symbol, code_length, code_bits)` — the unit the header and the code
/// assigner both deal in. `code` occupies its low `length` bits.
#[derive(Clone, Copy, Debug)]
pub struct CodeEntry {
    pub symbol: u8,
    pub length: u8,
    pub code: u64,
}

/// Build a tree with `leaves.len()` leaves and `leaves.len() - 1` internal
/// nodes from a list of populated symbols **pre-sorted ascending by
/// occurrence** (`spec.md` §4.2). `leaves.len() == 0` is rejected by the
/// caller as empty input; `leaves.len() == 1` is handled as a special case
/// by the caller (`spec.md`'s resolution of the single-symbol open
/// question), not here.
pub fn build(leaves: &[Symbol]) -> Result<Tree, Error> {
    assert!(leaves.len() >= 2, "degenerate cases are handled by the caller");

    let mut arena: Vec<TreeNode> = Vec::new();
    arena
        .try_reserve_exact(2 * leaves.len() - 1)
        .map_err(|_| Error::Alloc)?;

    // Two FIFOs: `pending_leaves` holds leaf indices in the caller's
    // ascending order, `pending_internals` holds freshly merged internal
    // nodes in creation order (also ascending, since merging two
    // ascending-weight items always yields a non-decreasing sequence of
    // sums). Popping the smaller of the two fronts, with internal nodes
    // preferred on a tie, reproduces `spec.md` §4.2's tie-break rule.
    let mut pending_leaves: VecDeque<u32> = VecDeque::with_capacity(leaves.len());
    for s in leaves {
        let idx = arena.len() as u32;
        arena.push(TreeNode::leaf(s.character, s.occurrences));
        pending_leaves.push_back(idx);
    }
    let mut pending_internals: VecDeque<u32> = VecDeque::new();

    let pop_min = |arena: &[TreeNode],
                   pending_leaves: &mut VecDeque<u32>,
                   pending_internals: &mut VecDeque<u32>|
     -> u32 {
        match (pending_leaves.front(), pending_internals.front()) {
            (Some(&l), Some(&i)) => {
                if arena[i as usize].weight <= arena[l as usize].weight {
                    pending_internals.pop_front().unwrap()
                } else {
                    pending_leaves.pop_front().unwrap()
                }
            }
            (Some(_), None) => pending_leaves.pop_front().unwrap(),
            (None, Some(_)) => pending_internals.pop_front().unwrap(),
            (None, None) => unreachable!("ran out of nodes before the tree closed"),
        }
    };

    let total_nodes = leaves.len();
    let mut remaining = total_nodes;
    while remaining > 1 {
        let a = pop_min(&arena, &mut pending_leaves, &mut pending_internals);
        let b = pop_min(&arena, &mut pending_leaves, &mut pending_internals);
        // `a` was drawn first and so is <= `b` in weight (each pop_min
        // returns the globally smallest remaining node). Higher weight on
        // the left, lower on the right, per spec.md §4.2.
        let weight = arena[a as usize].weight + arena[b as usize].weight;
        let idx = arena.len() as u32;
        arena.push(TreeNode::internal(weight, b, a));
        pending_internals.push_back(idx);
        remaining -= 1;
    }

    let root = pending_internals
        .pop_front()
        .expect("final merge always leaves exactly one internal node");
    Ok(Tree { arena, root })
}

/// Depth-first walk assigning `(length, code)` to every leaf, per
/// `spec.md` §4.3. Returns entries sorted ascending by byte value (the
/// order the header writer needs), regardless of tree-build order.
pub fn assign_codes(tree: &Tree) -> Vec<CodeEntry> {
    let mut entries = Vec::new();
    walk(tree, tree.root, 0, 0, &mut entries);
    entries.sort_by_key(|e| e.symbol);
    entries
}

fn walk(tree: &Tree, node: u32, depth: u8, code: u64, out: &mut Vec<CodeEntry>) {
    let n = &tree.arena[node as usize];
    if let Some(character) = n.symbol {
        out.push(CodeEntry { symbol: character, length: depth, code });
        return;
    }
    walk(tree, n.left.unwrap(), depth + 1, code << 1, out);
    walk(tree, n.right.unwrap(), depth + 1, (code << 1) | 1, out);
}

/// Single-symbol degenerate case (`spec.md` §3/§9): one leaf, assigned
/// `length = 1, code = 0` by the spec's own resolution of the original's
/// malformed zero-length code.
pub fn single_symbol_code(character: u8) -> CodeEntry {
    CodeEntry { symbol: character, length: 1, code: 0 }
}

/// Rebuild a decoding trie purely from `(symbol, length, code)` tuples, per
/// `spec.md` §4.7. Each leaf is inserted by walking from the root one bit
/// at a time, from bit `length-1` down to `0` (MSB first), allocating
/// internal nodes lazily.
pub fn reconstruct(entries: &[CodeEntry]) -> Result<Tree, Error> {
    if entries.len() == 1 {
        // A lone leaf acts as its own one-node tree; the decoder special
        // cases this (every bit maps straight to the single symbol).
        let mut arena = Vec::new();
        arena.try_reserve_exact(1).map_err(|_| Error::Alloc)?;
        arena.push(TreeNode::leaf(entries[0].symbol, 0));
        return Ok(Tree { arena, root: 0 });
    }

    let mut arena: Vec<TreeNode> = Vec::new();
    arena
        .try_reserve_exact(2 * entries.len() - 1)
        .map_err(|_| Error::Alloc)?;
    let root = 0u32;
    arena.push(TreeNode { weight: 0, left: None, right: None, symbol: None });

    for e in entries {
        let mut branch = root;
        debug_assert!(e.length >= 1 && e.length <= 64);
        for bit_pos in (0..e.length).rev() {
            let bit = (e.code >> bit_pos) & 1 == 1;
            let at_leaf_depth = bit_pos == 0;
            let child_slot = if bit {
                arena[branch as usize].right
            } else {
                arena[branch as usize].left
            };
            if at_leaf_depth {
                let leaf_idx = arena.len() as u32;
                arena.push(TreeNode::leaf(e.symbol, 0));
                if bit {
                    arena[branch as usize].right = Some(leaf_idx);
                } else {
                    arena[branch as usize].left = Some(leaf_idx);
                }
            } else {
                match child_slot {
                    Some(next) => branch = next,
                    None => {
                        let new_idx = arena.len() as u32;
                        arena.push(TreeNode { weight: 0, left: None, right: None, symbol: None });
                        if bit {
                            arena[branch as usize].right = Some(new_idx);
                        } else {
                            arena[branch as usize].left = Some(new_idx);
                        }
                        branch = new_idx;
                    }
                }
            }
        }
    }

    Ok(Tree { arena, root })
}
