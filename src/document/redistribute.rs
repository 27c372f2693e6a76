/*!
 * Write-back of translated text across a unit's original runs.
 *
 * With one run the translation replaces it wholesale. With several, run `i`
 * receives `floor(len(translated) * original_len_i / total_original_len)`
 * characters taken from a running cursor, and the last run takes whatever
 * remains. Slices therefore always concatenate to the full translation.
 * Runs with an original length of zero are left alone.
 */

use super::model::{Layout, RunId};
use super::walker::TranslationUnit;

/// Number of characters each length-weighted run receives.
///
/// Zero weights receive zero; the last non-zero weight absorbs the remainder.
pub fn split_lengths(original_lens: &[usize], translated_len: usize) -> Vec<usize> {
    let total: usize = original_lens.iter().sum();
    let mut lengths = vec![0; original_lens.len()];
    let Some(last) = original_lens.iter().rposition(|len| *len > 0) else {
        return lengths;
    };

    let mut assigned = 0;
    for (i, len) in original_lens.iter().enumerate().take(last) {
        if *len == 0 {
            continue;
        }
        let share = (translated_len as u128 * *len as u128 / total as u128) as usize;
        lengths[i] = share;
        assigned += share;
    }
    lengths[last] = translated_len.saturating_sub(assigned);
    lengths
}

/// Slices of `translated` for each run of the unit, in run order
pub fn partition(unit: &TranslationUnit, translated: &str) -> Vec<(RunId, String)> {
    let active: Vec<_> = unit.runs.iter().filter(|r| r.original_len > 0).collect();
    if active.len() == 1 {
        return vec![(active[0].run_id, translated.to_string())];
    }

    let weights: Vec<usize> = active.iter().map(|r| r.original_len).collect();
    let lengths = split_lengths(&weights, translated.chars().count());

    let mut rest = translated;
    active.iter()
        .zip(lengths)
        .map(|(run, len)| {
            let cut = rest.char_indices().nth(len).map(|(byte, _)| byte).unwrap_or(rest.len());
            let (slice, tail) = rest.split_at(cut);
            rest = tail;
            (run.run_id, slice.to_string())
        })
        .collect()
}

/// Write a unit's translation into the layout
pub fn apply(layout: &mut Layout, unit: &TranslationUnit, translated: &str) {
    for (run_id, text) in partition(unit, translated) {
        layout.set_run_text(run_id, text);
    }
}
