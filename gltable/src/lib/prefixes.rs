use glgrammar::{PfxIdx, RIdx, SymIdx};

use crate::table::{CompiledRule, PrefixTableError};

/// One node of a shared-prefix trie: the first `length` items of every rule
/// in `rules` agree pointwise. The node whose length equals its first rule's
/// item count is the complete node for that rule.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct Prefix {
    pub(crate) target: SymIdx,
    pub(crate) length: usize,
    pub(crate) rules: Vec<RIdx>,
    /// Nodes extending this prefix by one item, in item-id order.
    pub(crate) children: Vec<PfxIdx>,
}

impl Prefix {
    /// The rule completely represented by this node, if any.
    pub(crate) fn completed_rule(&self, crules: &[CompiledRule]) -> Option<RIdx> {
        let first = self.rules[0];
        if crules[usize::from(first)].items.len() == self.length {
            Some(first)
        } else {
            None
        }
    }
}

/// Build the trie for one non-terminal into `arena`, recording each rule's
/// complete node in `crules` as it is reached. `rules` must be sorted
/// lexicographically by item ids, which makes every partition a contiguous
/// run. Returns the id of the node built by this call; nodes are numbered
/// in depth-first construction order.
pub(crate) fn build(
    arena: &mut Vec<Prefix>,
    crules: &mut [CompiledRule],
    target: SymIdx,
    length: usize,
    rules: Vec<RIdx>,
) -> Result<PfxIdx, PrefixTableError> {
    let me = PfxIdx::new(arena.len());
    arena.push(Prefix {
        target,
        length,
        rules: rules.clone(),
        children: Vec::new(),
    });

    let mut rest = &rules[..];
    if crules[usize::from(rules[0])].items.len() == length {
        crules[usize::from(rules[0])].full_prefix = Some(me);
        rest = &rules[1..];
        if let Some(&next) = rest.first() {
            if crules[usize::from(next)].items.len() == length {
                // Same target, same items: the two rules would need the
                // same complete node.
                return Err(PrefixTableError::DuplicateProduction(rules[0], next));
            }
        }
    }

    let mut i = 0;
    while i < rest.len() {
        let item = crules[usize::from(rest[i])].items[length];
        let mut j = i + 1;
        while j < rest.len() && crules[usize::from(rest[j])].items[length] == item {
            j += 1;
        }
        let child = build(arena, crules, target, length + 1, rest[i..j].to_vec())?;
        arena[usize::from(me)].children.push(child);
        i = j;
    }

    Ok(me)
}
