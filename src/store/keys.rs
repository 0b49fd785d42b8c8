//! Collision-free heading keys.

/// Return `base` if unused, else the first `"{base} (n)"` with `n >= 2` that is free.
///
/// The counter grows without bound, so this never fails while `is_taken` eventually
/// returns `false`.
pub fn unique_key<F>(base: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    if !is_taken(base) {
        return base.to_string();
    }

    let mut counter: u64 = 2;
    loop {
        let candidate = format!("{base} ({counter})");
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
