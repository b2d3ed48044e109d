//! Bargaining over an ad: a buyer makes an offer, the seller accepts or
//! rejects it, and an accepted bargain opens a delivery transaction.

use crate::application::{Application, ApplyExt, TransitionError};
use crate::command::{Command, CommandHandler};
use crate::core::EntityId;
use crate::log::LogError;
use crate::registry::Registry;
use crate::{state_enum, transition_enum};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct AdId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct UserId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TransactionId(pub i64);

impl fmt::Display for AdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ad {}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {}", self.0)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NotFound {
    pub id: EntityId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingForAcceptance {
    pub id: EntityId,
    pub ad: AdId,
    pub buyer: UserId,
    pub price: u32,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingForTransaction {
    pub id: EntityId,
    pub ad: AdId,
    pub buyer: UserId,
    pub price: u32,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Rejected {
    pub id: EntityId,
    pub user: UserId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TransactionCreated {
    pub id: EntityId,
    pub ad: AdId,
    pub buyer: UserId,
    pub price: u32,
    pub transaction_id: TransactionId,
}

state_enum! {
    pub enum BargainState: BargainStateKind {
        NotFound(NotFound),
        WaitingForAcceptance(WaitingForAcceptance),
        WaitingForTransaction(WaitingForTransaction),
        Rejected(Rejected),
        TransactionCreated(TransactionCreated),
    }
    entity_id: id
    final: [Rejected, TransactionCreated]
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SellerOfferedBargain {
    pub ad: AdId,
    pub buyer: UserId,
    pub price: u32,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RejectedBargain {
    pub user: UserId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AcceptedBargain {
    pub user: UserId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TransactionStarted {
    pub transaction_id: TransactionId,
}

transition_enum! {
    pub enum BargainEvent: BargainEventKind {
        SellerOfferedBargain(SellerOfferedBargain),
        RejectedBargain(RejectedBargain),
        AcceptedBargain(AcceptedBargain),
        TransactionStarted(TransactionStarted),
    }
}

/// The bargaining transitions.
pub fn registry() -> Registry<BargainState, BargainEvent> {
    Registry::builder()
        .on(|not_found: &NotFound, offered: &SellerOfferedBargain| WaitingForAcceptance {
            id: not_found.id,
            ad: offered.ad,
            buyer: offered.buyer,
            price: offered.price,
        })
        .on(|waiting: &WaitingForAcceptance, rejected: &RejectedBargain| Rejected {
            id: waiting.id,
            user: rejected.user,
        })
        .on(|waiting: &WaitingForAcceptance, _: &AcceptedBargain| WaitingForTransaction {
            id: waiting.id,
            ad: waiting.ad,
            buyer: waiting.buyer,
            price: waiting.price,
        })
        .on(|waiting: &WaitingForTransaction, started: &TransactionStarted| TransactionCreated {
            id: waiting.id,
            ad: waiting.ad,
            buyer: waiting.buyer,
            price: waiting.price,
            transaction_id: started.transaction_id,
        })
        .on(|waiting: &WaitingForTransaction, rejected: &RejectedBargain| Rejected {
            id: waiting.id,
            user: rejected.user,
        })
        .build()
        .expect("bargain transitions are well formed")
}

#[derive(Clone, Debug, PartialEq)]
pub enum BargainCommand {
    CreateBargain { ad: AdId, buyer: UserId, price: u32 },
    RejectBargain { bargain: EntityId, user: UserId },
    /// Accept, then open the delivery transaction in the same command
    AcceptBargain { bargain: EntityId, user: UserId },
    /// Retry opening the transaction of an already accepted bargain
    StartTransaction { bargain: EntityId },
}

impl Command for BargainCommand {
    fn name(&self) -> &str {
        match self {
            Self::CreateBargain { .. } => "CreateBargain",
            Self::RejectBargain { .. } => "RejectBargain",
            Self::AcceptBargain { .. } => "AcceptBargain",
            Self::StartTransaction { .. } => "StartTransaction",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BargainError {
    #[error(transparent)]
    Transition(#[from] TransitionError<BargainState, BargainEvent>),

    #[error("A bargain for {ad} by {buyer} is already waiting for acceptance")]
    AlreadyExists { ad: AdId, buyer: UserId },

    #[error("Transaction could not be started: {0}")]
    TransactionFailed(String),

    #[error(transparent)]
    Log(#[from] LogError),
}

/// Domain handler for bargains.
///
/// - `find` looks up the bargain a buyer has open on an ad
/// - `fetch` rebuilds a bargain's current state
/// - `start_transaction` opens the delivery transaction with the external
///   service
///
/// `find` and `fetch` share one error type, converted into [`BargainError`].
pub struct BargainHandler<Find, Fetch, Start> {
    registry: Registry<BargainState, BargainEvent>,
    find: Find,
    fetch: Fetch,
    start_transaction: Start,
}

impl<Find, Fetch, Start, E> BargainHandler<Find, Fetch, Start>
where
    Find: Fn(UserId, AdId) -> Result<Option<BargainState>, E>,
    Fetch: Fn(EntityId) -> Result<BargainState, E>,
    Start: Fn(UserId, AdId) -> Result<TransactionId, BargainError>,
    BargainError: From<E>,
{
    pub fn new(
        registry: Registry<BargainState, BargainEvent>,
        find: Find,
        fetch: Fetch,
        start_transaction: Start,
    ) -> Self {
        Self {
            registry,
            find,
            fetch,
            start_transaction,
        }
    }

    fn create(
        &self,
        ad: AdId,
        buyer: UserId,
        price: u32,
    ) -> Result<Application<BargainState, BargainEvent>, BargainError> {
        if let Some(BargainState::WaitingForAcceptance(_)) = (self.find)(buyer, ad)? {
            return Err(BargainError::AlreadyExists { ad, buyer });
        }

        let application = self.registry.apply_transition(
            NotFound { id: EntityId::new() }.into(),
            SellerOfferedBargain { ad, buyer, price }.into(),
        )?;
        Ok(application.into())
    }

    fn open_transaction(
        &self,
        waiting: &WaitingForTransaction,
    ) -> Result<TransactionStarted, BargainError> {
        let transaction_id = (self.start_transaction)(waiting.buyer, waiting.ad)?;
        Ok(TransactionStarted { transaction_id })
    }
}

impl<Find, Fetch, Start, E> CommandHandler for BargainHandler<Find, Fetch, Start>
where
    Find: Fn(UserId, AdId) -> Result<Option<BargainState>, E>,
    Fetch: Fn(EntityId) -> Result<BargainState, E>,
    Start: Fn(UserId, AdId) -> Result<TransactionId, BargainError>,
    BargainError: From<E>,
{
    type Command = BargainCommand;
    type State = BargainState;
    type Transition = BargainEvent;
    type Error = BargainError;

    fn invoke(
        &self,
        command: BargainCommand,
    ) -> Result<Application<BargainState, BargainEvent>, BargainError> {
        match command {
            BargainCommand::CreateBargain { ad, buyer, price } => self.create(ad, buyer, price),
            BargainCommand::RejectBargain { bargain, user } => {
                let application = self
                    .registry
                    .apply_transition((self.fetch)(bargain)?, RejectedBargain { user }.into())?;
                Ok(application.into())
            }
            BargainCommand::AcceptBargain { bargain, user } => self
                .registry
                .apply_transition((self.fetch)(bargain)?, AcceptedBargain { user }.into())
                .map_err(<BargainError as From<TransitionError<BargainState, BargainEvent>>>::from)
                .then_with_effect(|waiting: &WaitingForTransaction| self.open_transaction(waiting))
                .map(Application::from),
            BargainCommand::StartTransaction { bargain } => self
                .registry
                .apply_with_effect((self.fetch)(bargain)?, |waiting: &WaitingForTransaction| {
                    self.open_transaction(waiting)
                })
                .map(Application::from),
        }
    }
}
