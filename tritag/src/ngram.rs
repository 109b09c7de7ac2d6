//! N-gram keys over tag ids.

use bincode::{Decode, Encode};

/// Dense integer id of a tag. Ids are assigned in order of first appearance.
pub type TagId = u32;

/// A single tag.
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct UniGram(pub TagId);

/// A pair of consecutive tags.
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BiGram(pub TagId, pub TagId);

/// Three consecutive tags.
#[derive(Clone, Copy, Debug, Decode, Encode, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TriGram(pub TagId, pub TagId, pub TagId);

impl BiGram {
    /// The first tag as a unigram.
    #[inline]
    pub const fn first(self) -> UniGram {
        UniGram(self.0)
    }

    /// The second tag as a unigram.
    #[inline]
    pub const fn second(self) -> UniGram {
        UniGram(self.1)
    }
}

impl TriGram {
    /// The first two tags, i.e., the context of the third tag.
    #[inline]
    pub const fn context(self) -> BiGram {
        BiGram(self.0, self.1)
    }

    /// The last two tags.
    #[inline]
    pub const fn suffix(self) -> BiGram {
        BiGram(self.1, self.2)
    }

    /// The third tag.
    #[inline]
    pub const fn last(self) -> UniGram {
        UniGram(self.2)
    }
}
