use std::hash::{BuildHasher, Hasher};

use hashbrown::HashMap;

/// Hash map used for the read-only lookup tables built at tagger construction.
pub type FastMap<K, V> = HashMap<K, V, SplitMix64Builder>;

// Copied from https://prng.di.unimi.it/splitmix64.c
pub struct SplitMix64 {
    x: u64,
}

impl SplitMix64 {
    fn add(&mut self, i: u64) {
        self.x ^= i;
        self.x = self.x.wrapping_add(0x9e3779b97f4a7c15);
        self.x = (self.x ^ (self.x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        self.x = (self.x ^ (self.x >> 27)).wrapping_mul(0x94d049bb133111eb);
        self.x = self.x ^ (self.x >> 31);
    }
}

impl Hasher for SplitMix64 {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.x
    }

    #[inline(always)]
    fn write(&mut self, bytes: &[u8]) {
        for &i in bytes {
            self.add(u64::from(i));
        }
    }

    #[inline(always)]
    fn write_u8(&mut self, i: u8) {
        self.add(u64::from(i));
    }

    #[inline(always)]
    fn write_u32(&mut self, i: u32) {
        self.add(u64::from(i));
    }

    #[inline(always)]
    fn write_u64(&mut self, i: u64) {
        self.add(i);
    }

    #[inline(always)]
    fn write_usize(&mut self, i: usize) {
        self.add(i as u64);
    }
}

#[derive(Clone, Copy, Default)]
pub struct SplitMix64Builder;

impl BuildHasher for SplitMix64Builder {
    type Hasher = SplitMix64;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        SplitMix64 { x: 0 }
    }
}

/// Returns `true` if the first character of `word` is uppercase.
#[inline]
pub fn starts_with_uppercase(word: &str) -> bool {
    word.chars().next().map_or(false, char::is_uppercase)
}

/// Lowercases the first character of `word`, keeping the rest as is.
pub fn decapitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        let mut result: String = first.to_lowercase().collect();
        result.push_str(chars.as_str());
        result
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_uppercase() {
        assert!(starts_with_uppercase("Dog"));
        assert!(starts_with_uppercase("Élan"));
        assert!(!starts_with_uppercase("dog"));
        assert!(!starts_with_uppercase("1984"));
        assert!(!starts_with_uppercase(""));
    }

    #[test]
    fn test_decapitalize() {
        assert_eq!("the", decapitalize("The"));
        assert_eq!("a/a", decapitalize("A/a"));
        assert_eq!("éLAN", decapitalize("ÉLAN"));
        assert_eq!("", decapitalize(""));
    }

    #[test]
    fn test_fast_map_lookup() {
        let mut map = FastMap::default();
        map.insert((1u32, 2u32), 0.5);
        map.insert((2u32, 1u32), 0.25);
        assert_eq!(Some(&0.5), map.get(&(1, 2)));
        assert_eq!(Some(&0.25), map.get(&(2, 1)));
        assert_eq!(None, map.get(&(1, 1)));
    }
}
