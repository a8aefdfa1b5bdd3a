use rand::Rng;

use crate::{models::Category, services::sampling::shuffle};

/// Leading rails that the diversity setting never touches
pub const PROTECTED_PREFIX: usize = 3;

/// Diversity value at which the composed list is left unchanged
pub const NEUTRAL_DIVERSITY: u8 = 50;

/// Share of the unprotected rails kept when leaning towards similar content, in tenths
const SIMILAR_KEEP_TENTHS: usize = 7;

/// Rails repeated at the end when leaning towards variety
const DIVERSE_EXTRA: usize = 2;

/// Reshapes `fixed ++ pool` according to the diversity setting.
///
/// Below 50 the unprotected tail is truncated to its first 70%. Above 50 two
/// rails picked at random from the unprotected tail are appended again, so
/// they appear twice. Exactly 50 returns the input as is. The first three
/// rails are kept in place in every case.
pub fn apply_diversity<R: Rng + ?Sized>(
    categories: Vec<Category>,
    diversity: u8,
    rng: &mut R,
) -> Vec<Category> {
    if diversity == NEUTRAL_DIVERSITY {
        return categories;
    }

    let split = categories.len().min(PROTECTED_PREFIX);
    let mut result = categories;
    let remainder = result.split_off(split);

    if diversity < NEUTRAL_DIVERSITY {
        let keep = remainder.len() * SIMILAR_KEEP_TENTHS / 10;
        result.extend(remainder.into_iter().take(keep));
    } else {
        let repeats: Vec<Category> = shuffle(remainder.clone(), rng)
            .into_iter()
            .take(DIVERSE_EXTRA)
            .collect();
        result.extend(remainder);
        result.extend(repeats);
    }

    tracing::debug!(
        diversity,
        categories = result.len(),
        "Diversity applied"
    );

    result
}
