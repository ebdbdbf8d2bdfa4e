use cosmwasm_std::Uint128;
use thiserror::Error;

/// Percentages are whole numbers and must add up to exactly this.
pub const PERCENT_TOTAL: u32 = 100;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SplitError {
    #[error("percentages sum to {total}, expected 100")]
    InvalidPercentageSum { total: u32 },

    #[error("split remainder underflow")]
    Underflow,
}

/// Sum of a percentage list, widened so it cannot wrap.
pub fn percentage_sum(percentages: &[u8]) -> u32 {
    percentages.iter().map(|p| u32::from(*p)).sum()
}

/// Split `amount` across an ordered list of percentages.
///
/// `payout_i = floor(amount * pct_i / 100)` for every entry but the last;
/// the last entry receives `amount - sum(previous payouts)`. The returned
/// payouts always add up to `amount` exactly, and the last-listed entry is
/// the one that absorbs the rounding remainder.
///
/// Fails if the list is empty or the percentages do not sum to 100.
pub fn split_by_percentage(amount: Uint128, percentages: &[u8]) -> Result<Vec<Uint128>, SplitError> {
    let total = percentage_sum(percentages);
    if percentages.is_empty() || total != PERCENT_TOTAL {
        return Err(SplitError::InvalidPercentageSum { total });
    }

    let last = percentages.len() - 1;
    let mut payouts = Vec::with_capacity(percentages.len());
    let mut distributed = Uint128::zero();

    for pct in &percentages[..last] {
        // pct <= 100, so the ratio never exceeds `amount`
        let payout = amount.multiply_ratio(u128::from(*pct), u128::from(PERCENT_TOTAL));
        distributed += payout;
        payouts.push(payout);
    }

    let remainder = amount
        .checked_sub(distributed)
        .map_err(|_| SplitError::Underflow)?;
    payouts.push(remainder);

    Ok(payouts)
}
