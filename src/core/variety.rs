/// Variety pass: controlled randomization across title, text, and image
/// variants.
///
/// Text variety picks uniformly among the original and its variants.
/// Image variety is rarer: a variant list is considered only when a fair
/// coin flip says so, keeping the original art the common case.
use rand::seq::SliceRandom;
use rand::Rng;

/// Probability that a page with image variants swaps to one of them.
pub const IMAGE_VARIANT_PROBABILITY: f64 = 0.5;

/// Choose between `original` and `variants`.
///
/// With randomization disabled, or no variants, `original` is returned
/// without touching `rng`.
pub fn pick_text<'a, R: Rng + ?Sized>(
    original: &'a str,
    variants: &'a [String],
    enabled: bool,
    rng: &mut R,
) -> &'a str {
    if !enabled || variants.is_empty() {
        return original;
    }
    let index = rng.gen_range(0..=variants.len());
    match index.checked_sub(1) {
        Some(i) => variants[i].as_str(),
        None => original,
    }
}

/// Choose an image token list.
///
/// The original list is kept unless randomization is on, variants exist,
/// and the coin flip selects a variant.
pub fn pick_images<'a, R: Rng + ?Sized>(
    original: &'a [String],
    variants: &'a [Vec<String>],
    enabled: bool,
    rng: &mut R,
) -> &'a [String] {
    if !enabled || variants.is_empty() || !rng.gen_bool(IMAGE_VARIANT_PROBABILITY) {
        return original;
    }
    variants
        .choose(rng)
        .map(Vec::as_slice)
        .unwrap_or(original)
}
