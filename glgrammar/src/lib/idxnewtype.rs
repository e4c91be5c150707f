// This macro generates a struct which exposes a usize-convertible API over a
// u32 stored index.

use std::mem::size_of;

macro_rules! IdxNewtype {
    ($(#[$attr:meta])* $n: ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $n(pub u32);

        impl From<$n> for usize {
            fn from(idx: $n) -> Self {
                debug_assert!(size_of::<usize>() >= size_of::<u32>());
                num_traits::cast(idx.0).unwrap()
            }
        }

        impl $n {
            /// Wrap `i`, panicking if it does not fit in the stored width.
            pub fn new(i: usize) -> Self {
                $n(num_traits::cast(i).unwrap())
            }
        }
    }
}

// Will anyone write a grammar with more than 4 billion symbols, rules, or
// prefix nodes? All practical grammars are comfortably inside u32, and the
// stored width can widen later without changing the visible API.

IdxNewtype!(
    /// A type specifically for symbol indices.
    ///
    /// Inside a [`Grammar`](crate::Grammar) this is the interning order.
    /// Inside a compiled table set the same type carries the terminal-first
    /// numbering; the two spaces never mix, since table construction
    /// consumes names, not grammar indices.
    SymIdx
);
IdxNewtype!(
    /// A type specifically for rule indices. Rules are numbered in the
    /// order they were added to the grammar.
    RIdx
);
IdxNewtype!(
    /// A type specifically for prefix-node indices, assigned in trie
    /// construction order.
    PfxIdx
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_usize_round_trip() {
        assert_eq!(usize::from(SymIdx::new(0)), 0);
        assert_eq!(usize::from(RIdx::new(12)), 12);
        assert_eq!(usize::from(PfxIdx(7)), 7);
    }

    #[test]
    #[should_panic]
    fn test_overflow_panics() {
        SymIdx::new(usize::MAX);
    }
}
