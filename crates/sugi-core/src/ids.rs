//! Index newtypes addressing the flat node/edge vectors in [`crate::graph::Graph`].
//!
//! Raw `usize` indices are never passed between engine components: every
//! function that walks the graph takes and returns a `NodeId` or `EdgeId`, so
//! a node index can never be fed where an edge index belongs (and vice
//! versa), and both stay distinct from the "position within a layer" indices
//! used by [`crate::graph::Layer`].

use std::fmt;

macro_rules! index_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub(crate) fn new(index: usize) -> Self {
                $name(index as u32)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_newtype!(NodeId);
index_newtype!(EdgeId);
