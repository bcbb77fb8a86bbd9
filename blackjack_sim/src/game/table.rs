use blackjack_lib::{BlackjackGameError, Deck, Hand, Outcome, BLACKJACK};
use tracing::debug;

/// Both the player and the dealer draw until their hand is worth at least this much.
pub const HIT_THRESHOLD: u32 = 17;

/// Cards needed for the initial deal, two to the player and two to the dealer.
const INITIAL_DEAL: usize = 4;

/// The hands and outcome of a resolved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    pub outcome: Outcome,
    pub players_hand: Hand,
    pub dealers_hand: Hand,
}

impl RoundResult {
    pub fn player_total(&self) -> u32 {
        self.players_hand.value()
    }

    pub fn dealer_total(&self) -> u32 {
        self.dealers_hand.value()
    }

    /// True when the player was dealt a two card 21.
    pub fn natural(&self) -> bool {
        self.players_hand.is_blackjack()
    }
}

/// Deals two cards each, alternating player then dealer, from the top of `deck`.
pub fn deal_hand(deck: &mut Deck) -> Result<(Hand, Hand), BlackjackGameError> {
    if deck.len() < INITIAL_DEAL {
        return Err(BlackjackGameError::DeckUnderflow {
            needed: INITIAL_DEAL,
            remaining: deck.len(),
        });
    }

    let mut players_hand = Hand::new();
    let mut dealers_hand = Hand::new();
    for _ in 0..2 {
        players_hand.receive_card(deck.draw()?);
        dealers_hand.receive_card(deck.draw()?);
    }
    Ok((players_hand, dealers_hand))
}

/// Draws cards into `hand` until it is worth at least `HIT_THRESHOLD`. A bust ends the loop as well.
pub fn hit_until_threshold(hand: &mut Hand, deck: &mut Deck) -> Result<(), BlackjackGameError> {
    while hand.value() < HIT_THRESHOLD {
        hand.receive_card(deck.draw()?);
    }
    Ok(())
}

/// Decides the outcome from the final totals. A player bust loses even when the dealer busts too.
pub fn resolve(player_total: u32, dealer_total: u32) -> Outcome {
    if player_total > BLACKJACK {
        Outcome::Loss
    } else if dealer_total > BLACKJACK || player_total > dealer_total {
        Outcome::Win
    } else if player_total < dealer_total {
        Outcome::Loss
    } else {
        Outcome::Tie
    }
}

/// Plays out a complete round from `deck`: the deal, the player's draws, then the dealer's draws.
/// Fails with `DeckUnderflow` if the deck runs out part way through.
pub fn play_round(deck: &mut Deck) -> Result<RoundResult, BlackjackGameError> {
    let (mut players_hand, mut dealers_hand) = deal_hand(deck)?;

    hit_until_threshold(&mut players_hand, deck)?;
    hit_until_threshold(&mut dealers_hand, deck)?;

    let outcome = resolve(players_hand.value(), dealers_hand.value());
    debug!(
        player = %players_hand,
        dealer = %dealers_hand,
        %outcome,
        "round resolved"
    );

    Ok(RoundResult {
        outcome,
        players_hand,
        dealers_hand,
    })
}
