//! Playing cards as ingredient sources.
//!
//! Every card of a standard 52-card deck maps to one ingredient. Spades are
//! spirits, hearts juices and mixers, diamonds sweeteners and liqueurs, clubs
//! herbs, bitters and vermouths.

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::AdventureError;
use crate::services::{CardDealer, Clock};

const CARD_IMAGE_BASE: &str = "https://deckofcardsapi.com/static/img";

const CARD_INGREDIENTS: [(&str, &str); 52] = [
    ("AS", "Rum"),
    ("2S", "Gin"),
    ("3S", "Tequila"),
    ("4S", "Whiskey"),
    ("5S", "Vodka"),
    ("6S", "Brandy"),
    ("7S", "Mezcal"),
    ("8S", "Sake"),
    ("9S", "Absinthe"),
    ("10S", "Pernod"),
    ("JS", "Cognac"),
    ("QS", "Pisco"),
    ("KS", "Chartreuse"),
    ("AH", "Lime Juice"),
    ("2H", "Lemon Juice"),
    ("3H", "Orange Juice"),
    ("4H", "Cranberry Juice"),
    ("5H", "Pineapple Juice"),
    ("6H", "Ginger Beer"),
    ("7H", "Tonic Water"),
    ("8H", "Club Soda"),
    ("9H", "Cola"),
    ("10H", "Ginger Ale"),
    ("JH", "Coconut Milk"),
    ("QH", "Tomato Juice"),
    ("KH", "Grenadine"),
    ("AD", "Simple Syrup"),
    ("2D", "Honey"),
    ("3D", "Agave Syrup"),
    ("4D", "Maple Syrup"),
    ("5D", "Brown Sugar"),
    ("6D", "Cinnamon Syrup"),
    ("7D", "Vanilla Syrup"),
    ("8D", "Orgeat"),
    ("9D", "Blue Curaçao"),
    ("10D", "Peach Schnapps"),
    ("JD", "Triple Sec"),
    ("QD", "Chambord"),
    ("KD", "Coffee Liqueur"),
    ("AC", "Fresh Mint"),
    ("2C", "Fresh Basil"),
    ("3C", "Rosemary"),
    ("4C", "Thyme"),
    ("5C", "Bitters"),
    ("6C", "Angostura Bitters"),
    ("7C", "Aromatic Bitters"),
    ("8C", "Cinnamon Powder"),
    ("9C", "Nutmeg"),
    ("10C", "Black Pepper"),
    ("JC", "Vermouth"),
    ("QC", "Dry Vermouth"),
    ("KC", "Sweet Vermouth"),
];

/// Card suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Spades, Self::Hearts, Self::Diamonds, Self::Clubs];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spades => "SPADES",
            Self::Hearts => "HEARTS",
            Self::Diamonds => "DIAMONDS",
            Self::Clubs => "CLUBS",
        }
    }

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Spades => 'S',
            Self::Hearts => 'H',
            Self::Diamonds => 'D',
            Self::Clubs => 'C',
        }
    }

    const fn from_code(code: char) -> Option<Self> {
        match code {
            'S' => Some(Self::Spades),
            'H' => Some(Self::Hearts),
            'D' => Some(Self::Diamonds),
            'C' => Some(Self::Clubs),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank codes in deck order.
pub const RANK_CODES: [&str; 13] = [
    "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];

fn rank_name(rank: &str) -> &str {
    match rank {
        "A" => "ACE",
        "J" => "JACK",
        "Q" => "QUEEN",
        "K" => "KING",
        other => other,
    }
}

fn card_code_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(10|0|[2-9AJQK])([SHDC])$").ok())
        .as_ref()
}

/// Split a card code into its rank code and suit.
///
/// Accepts both `10H` and the dealer shorthand `0H` for tens.
#[must_use]
pub fn parse_card_code(code: &str) -> Option<(&'static str, Suit)> {
    let captures = card_code_pattern()?.captures(code.trim())?;
    let rank = match captures.get(1)?.as_str() {
        "0" | "10" => "10",
        other => RANK_CODES.iter().copied().find(|candidate| *candidate == other)?,
    };
    let suit = Suit::from_code(captures.get(2)?.as_str().chars().next()?)?;
    Some((rank, suit))
}

/// Canonical code (`10H` rather than `0H`), or the input when unparseable.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    parse_card_code(code).map_or_else(
        || code.trim().to_string(),
        |(rank, suit)| format!("{rank}{}", suit.code()),
    )
}

/// A dealt card as reported by the dealer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub code: String,
    pub value: String,
    pub suit: String,
    #[serde(default)]
    pub image: String,
}

impl Card {
    /// Build a card from its code, filling value, suit and image names.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match parse_card_code(code) {
            Some((rank, suit)) => {
                let canonical = format!("{rank}{}", suit.code());
                let image_code = if rank == "10" {
                    format!("0{}", suit.code())
                } else {
                    canonical.clone()
                };
                Self {
                    code: canonical,
                    value: rank_name(rank).to_string(),
                    suit: suit.as_str().to_string(),
                    image: format!("{CARD_IMAGE_BASE}/{image_code}.png"),
                }
            }
            None => Self {
                code: code.to_string(),
                value: code.to_string(),
                suit: "UNKNOWN".to_string(),
                image: String::new(),
            },
        }
    }

    /// Human name such as `ACE of SPADES`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} of {}", self.value, self.suit)
    }
}

/// Every code of a standard deck, spades first.
#[must_use]
pub fn full_deck_codes() -> Vec<String> {
    Suit::ALL
        .iter()
        .flat_map(|suit| RANK_CODES.iter().map(move |rank| format!("{rank}{}", suit.code())))
        .collect()
}

/// Ingredient mapped to a card code, if the code belongs to the deck.
#[must_use]
pub fn ingredient_for_code(code: &str) -> Option<&'static str> {
    let canonical = normalize_code(code);
    CARD_INGREDIENTS
        .iter()
        .find(|(card, _)| *card == canonical)
        .map(|(_, ingredient)| *ingredient)
}

/// Ingredient granted by a card.
///
/// Unknown codes fall back to `"{value} of {suit}"` and log a warning.
#[must_use]
pub fn card_to_ingredient(card: &Card) -> String {
    if let Some(ingredient) = ingredient_for_code(&card.code) {
        return ingredient.to_string();
    }
    warn!("No ingredient mapped for card code {}", card.code);
    card.display_name()
}

/// Presentation details for a drawn card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub ingredient: String,
    pub card_name: String,
    pub image: String,
}

#[must_use]
pub fn card_details(card: &Card) -> CardDetails {
    CardDetails {
        ingredient: card_to_ingredient(card),
        card_name: card.display_name(),
        image: card.image.clone(),
    }
}

/// A card drawn during an adventure and the ingredient it granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCard {
    pub card_id: String,
    pub ingredient: String,
    pub timestamp: i64,
}

impl DrawnCard {
    #[must_use]
    pub fn from_card(card: &Card, timestamp: i64) -> Self {
        Self {
            card_id: card.code.clone(),
            ingredient: card_to_ingredient(card),
            timestamp,
        }
    }
}

/// Open a new deck.
///
/// # Errors
///
/// Returns [`AdventureError::DeckCreation`] when the dealer fails.
pub async fn create_deck<D>(dealer: &D) -> Result<String, AdventureError>
where
    D: CardDealer + ?Sized,
{
    let deck_id = dealer
        .create_deck()
        .await
        .map_err(AdventureError::DeckCreation)?;
    debug!("Opened deck {deck_id}");
    Ok(deck_id)
}

/// Draw one card, reshuffling once if the deck reports it is empty.
///
/// Any other draw failure is returned without a reshuffle.
///
/// # Errors
///
/// Returns [`AdventureError::Draw`] when the draw fails, the reshuffle fails,
/// or the draw after the reshuffle fails.
pub async fn draw_with_reshuffle<D>(dealer: &D, deck_id: &str) -> Result<Card, AdventureError>
where
    D: CardDealer + ?Sized,
{
    match dealer.draw_card(deck_id).await {
        Ok(card) => Ok(card),
        Err(err) if err.is_deck_empty() => {
            debug!("Deck {deck_id} exhausted, reshuffling");
            dealer
                .reshuffle_deck(deck_id)
                .await
                .map_err(AdventureError::Draw)?;
            dealer
                .draw_card(deck_id)
                .await
                .map_err(AdventureError::Draw)
        }
        Err(err) => Err(AdventureError::Draw(err)),
    }
}

/// Draw a card and record the ingredient it grants.
///
/// # Errors
///
/// Propagates [`draw_with_reshuffle`] failures.
pub async fn draw_ingredient<D, C>(
    dealer: &D,
    deck_id: &str,
    clock: &C,
) -> Result<DrawnCard, AdventureError>
where
    D: CardDealer + ?Sized,
    C: Clock + ?Sized,
{
    let card = draw_with_reshuffle(dealer, deck_id).await?;
    let drawn = DrawnCard::from_card(&card, clock.now_millis());
    debug!("Drew {} -> {}", drawn.card_id, drawn.ingredient);
    Ok(drawn)
}
