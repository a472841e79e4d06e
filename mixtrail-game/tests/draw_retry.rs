use async_trait::async_trait;
use futures::executor::block_on;
use mixtrail_game::{
    AdventureError, Card, CardDealer, ServiceError, draw_with_reshuffle, ingredient_for_code,
};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Dealer that replays scripted draw results and logs every call.
#[derive(Default)]
struct ScriptedDealer {
    draws: RefCell<VecDeque<Result<Card, ServiceError>>>,
    reshuffle_result: Option<ServiceError>,
    calls: RefCell<Vec<&'static str>>,
}

impl ScriptedDealer {
    fn with_draws(draws: Vec<Result<Card, ServiceError>>) -> Self {
        Self {
            draws: RefCell::new(draws.into()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

fn empty() -> ServiceError {
    ServiceError::DeckEmpty {
        deck_id: "deck".into(),
    }
}

#[async_trait(?Send)]
impl CardDealer for ScriptedDealer {
    async fn create_deck(&self) -> Result<String, ServiceError> {
        self.calls.borrow_mut().push("create");
        Ok("deck".into())
    }

    async fn draw_card(&self, _deck_id: &str) -> Result<Card, ServiceError> {
        self.calls.borrow_mut().push("draw");
        self.draws
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(empty()))
    }

    async fn reshuffle_deck(&self, _deck_id: &str) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push("reshuffle");
        self.reshuffle_result.clone().map_or(Ok(()), Err)
    }
}

#[test]
fn plain_draw_makes_one_call() {
    let dealer = ScriptedDealer::with_draws(vec![Ok(Card::from_code("AS"))]);
    let card = block_on(draw_with_reshuffle(&dealer, "deck")).unwrap();
    assert_eq!(ingredient_for_code(&card.code), Some("Rum"));
    assert_eq!(dealer.calls(), ["draw"]);
}

#[test]
fn empty_deck_reshuffles_then_draws_once() {
    let dealer = ScriptedDealer::with_draws(vec![Err(empty()), Ok(Card::from_code("KC"))]);
    let card = block_on(draw_with_reshuffle(&dealer, "deck")).unwrap();
    assert_eq!(ingredient_for_code(&card.code), Some("Sweet Vermouth"));
    assert_eq!(dealer.calls(), ["draw", "reshuffle", "draw"]);
}

#[test]
fn second_failure_surfaces_without_another_retry() {
    let dealer = ScriptedDealer::with_draws(vec![Err(empty()), Err(empty())]);
    let err = block_on(draw_with_reshuffle(&dealer, "deck")).unwrap_err();
    assert_eq!(err, AdventureError::Draw(empty()));
    assert_eq!(dealer.calls(), ["draw", "reshuffle", "draw"]);
}

#[test]
fn transport_errors_skip_the_reshuffle() {
    let network = ServiceError::Network("timeout".into());
    let dealer = ScriptedDealer::with_draws(vec![Err(network.clone())]);
    let err = block_on(draw_with_reshuffle(&dealer, "deck")).unwrap_err();
    assert_eq!(err, AdventureError::Draw(network));
    assert_eq!(dealer.calls(), ["draw"]);
}

#[test]
fn failed_reshuffle_is_a_draw_error() {
    let dealer = ScriptedDealer {
        draws: RefCell::new(VecDeque::from(vec![Err(empty())])),
        reshuffle_result: Some(ServiceError::Rejected("busy".into())),
        calls: RefCell::default(),
    };
    let err = block_on(draw_with_reshuffle(&dealer, "deck")).unwrap_err();
    assert_eq!(err, AdventureError::Draw(ServiceError::Rejected("busy".into())));
    assert_eq!(dealer.calls(), ["draw", "reshuffle"]);
}

#[test]
fn multi_draw_is_capped_at_a_deck() {
    let dealer = ScriptedDealer::with_draws(
        (0..60).map(|_| Ok(Card::from_code("2S"))).collect(),
    );
    let cards = block_on(dealer.draw_cards("deck", 60)).unwrap();
    assert_eq!(cards.len(), 52);
}
