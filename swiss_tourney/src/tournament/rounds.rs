//! Number of rounds a Swiss tournament needs.

/// Rounds required for `player_count` players: `ceil(log2(n))`, or 0 below
/// two players.
///
/// Computed on integers, so powers of two are exact (8 players need 3
/// rounds, 9 need 4).
///
/// ```
/// use swiss_tourney::tournament::required_rounds;
///
/// assert_eq!(required_rounds(1), 0);
/// assert_eq!(required_rounds(8), 3);
/// assert_eq!(required_rounds(9), 4);
/// ```
pub fn required_rounds(player_count: usize) -> u32 {
    if player_count < 2 {
        return 0;
    }
    // ceil(log2(n)) is the bit width of n - 1
    usize::BITS - (player_count - 1).leading_zeros()
}
