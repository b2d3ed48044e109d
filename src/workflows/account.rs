//! Account opening: a new account must be welcomed before it is usable.
//!
//! ```text
//! NotFound --Created--> NeedsWelcomeEmail --WelcomeMessageSent--> AccountOpen
//! ```

use crate::application::TransitionError;
use crate::core::EntityId;
use crate::registry::Registry;
use crate::{state_enum, transition_enum};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Email(pub String);

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct EmailTransactionId(pub String);

/// Amount in minor units (cents).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Money {
    pub cents: i64,
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let cents = self.cents.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NotFound {
    pub id: EntityId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NeedsWelcomeEmail {
    pub id: EntityId,
    pub email: Email,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AccountOpen {
    pub id: EntityId,
    pub balance: Money,
}

state_enum! {
    pub enum AccountState: AccountStateKind {
        NotFound(NotFound),
        NeedsWelcomeEmail(NeedsWelcomeEmail),
        AccountOpen(AccountOpen),
    }
    entity_id: id
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Created {
    pub email: Email,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WelcomeMessageSent {
    pub transaction_id: EmailTransactionId,
}

transition_enum! {
    pub enum AccountEvent: AccountEventKind {
        Created(Created),
        WelcomeMessageSent(WelcomeMessageSent),
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AccountError {
    #[error(transparent)]
    Transition(#[from] TransitionError<AccountState, AccountEvent>),

    #[error("Welcome email could not be sent: {0}")]
    EmailSendFailure(String),
}

/// The account opening transitions.
pub fn registry() -> Registry<AccountState, AccountEvent> {
    Registry::builder()
        .on(|not_found: &NotFound, created: &Created| NeedsWelcomeEmail {
            id: not_found.id,
            email: created.email.clone(),
        })
        .on(|needs: &NeedsWelcomeEmail, _: &WelcomeMessageSent| AccountOpen {
            id: needs.id,
            balance: Money::default(),
        })
        .build()
        .expect("account transitions are well formed")
}
