use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

/// Hash with a fixed-key hasher so equal inputs agree across runs of one build.
pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::Hash;

    #[test]
    fn equal_inputs_hash_equal() {
        let first = stable_hash_with(|hasher| ("server", 3_usize).hash(hasher));
        let second = stable_hash_with(|hasher| ("server", 3_usize).hash(hasher));
        let other = stable_hash_with(|hasher| ("server", 4_usize).hash(hasher));
        assert_eq!(first, second);
        assert_ne!(first, other);
    }
}
