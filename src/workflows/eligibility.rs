//! Article eligibility: deciding whether an accepted article is published
//! open access under an institutional deal, open access outside a deal, or
//! as a subscription article.
//!
//! Every state that has an outgoing transition can also be `Aborted`, which
//! is registered once with [`RegistryBuilder::for_all_states`].
//!
//! [`RegistryBuilder::for_all_states`]: crate::registry::RegistryBuilder::for_all_states

use crate::core::{EntityId, Identified};
use crate::registry::Registry;
use crate::{state_enum, transition_enum};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum JournalPublishingModel {
    Subscription,
    FullyOpenAccess,
    Hybrid,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Article {
    pub doi: String,
    pub journal: JournalPublishingModel,
    pub manuscript_link: String,
}

/// Institutions matched for the corresponding author, by signal.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct EligibilityMatches {
    pub by_ip: Option<String>,
    pub by_email: Option<String>,
    pub by_selection: Option<String>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Contract {
    pub institution: String,
    pub deal_name: Option<String>,
    pub opt_out_allowed: bool,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NotFound {
    pub id: EntityId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingForEligibilityCriteria {
    pub id: EntityId,
    pub article: Article,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingForEligibilityResult {
    pub id: EntityId,
    pub article: Article,
    pub matches: EligibilityMatches,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingForPublishingModelChoice {
    pub id: EntityId,
    pub article: Article,
    pub rejected_by_institution: bool,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingForAuthorConfirmation {
    pub id: EntityId,
    pub article: Article,
    pub matches: EligibilityMatches,
    pub contract: Contract,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingForInstitutionApproval {
    pub id: EntityId,
    pub article: Article,
    pub contract: Contract,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingToNotifyApprovalDecision {
    pub id: EntityId,
    pub article: Article,
    pub contract: Contract,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingToNotifyRejectionDecision {
    pub id: EntityId,
    pub article: Article,
    pub contract: Contract,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct WaitingForExternalEligibilityDecision {
    pub id: EntityId,
    pub article: Article,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DecidedAsSubscription {
    pub id: EntityId,
    pub article: Article,
    pub rejected_by_institution: bool,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct MustBeSubscription {
    pub id: EntityId,
    pub article: Article,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DecidedAsOaInDeal {
    pub id: EntityId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DecidedAsOaOutsideDeal {
    pub id: EntityId,
    pub article: Article,
    pub rejected_by_institution: bool,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct HasBeenAborted {
    pub id: EntityId,
}

state_enum! {
    pub enum EligibilityState: EligibilityStateKind {
        NotFound(NotFound),
        WaitingForEligibilityCriteria(WaitingForEligibilityCriteria),
        WaitingForEligibilityResult(WaitingForEligibilityResult),
        WaitingForPublishingModelChoice(WaitingForPublishingModelChoice),
        WaitingForAuthorConfirmation(WaitingForAuthorConfirmation),
        WaitingForInstitutionApproval(WaitingForInstitutionApproval),
        WaitingToNotifyApprovalDecision(WaitingToNotifyApprovalDecision),
        WaitingToNotifyRejectionDecision(WaitingToNotifyRejectionDecision),
        WaitingForExternalEligibilityDecision(WaitingForExternalEligibilityDecision),
        DecidedAsSubscription(DecidedAsSubscription),
        MustBeSubscription(MustBeSubscription),
        DecidedAsOaInDeal(DecidedAsOaInDeal),
        DecidedAsOaOutsideDeal(DecidedAsOaOutsideDeal),
        HasBeenAborted(HasBeenAborted),
    }
    entity_id: id
    final: [MustBeSubscription, DecidedAsOaInDeal, HasBeenAborted]
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CreatedEligibilityWorkflow {
    pub article: Article,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CreatedSubscriptionWorkflow {
    pub article: Article,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct EligibilityCriteriaCollected {
    pub matches: EligibilityMatches,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct NoDealFound;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DealFound {
    pub contract: Contract,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AuthorChoseSubscription;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AuthorChoseOa;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ApprovalRequested {
    pub approval_id: String,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ApprovedByInstitution {
    pub institution: String,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RejectedByInstitution;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AuthorNotifiedDecision {
    pub transmission_id: String,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ResetWorkflow;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PublishingModelChoiceReset;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ExternalEligibilityRequested;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ExternalEligibilityOutsideDeal;

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct ExternalEligibilityInDeal {
    pub contract_number: String,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Aborted {
    pub reason: String,
}

transition_enum! {
    pub enum EligibilityEvent: EligibilityEventKind {
        CreatedEligibilityWorkflow(CreatedEligibilityWorkflow),
        CreatedSubscriptionWorkflow(CreatedSubscriptionWorkflow),
        EligibilityCriteriaCollected(EligibilityCriteriaCollected),
        NoDealFound(NoDealFound),
        DealFound(DealFound),
        AuthorChoseSubscription(AuthorChoseSubscription),
        AuthorChoseOa(AuthorChoseOa),
        ApprovalRequested(ApprovalRequested),
        ApprovedByInstitution(ApprovedByInstitution),
        RejectedByInstitution(RejectedByInstitution),
        AuthorNotifiedDecision(AuthorNotifiedDecision),
        ResetWorkflow(ResetWorkflow),
        PublishingModelChoiceReset(PublishingModelChoiceReset),
        ExternalEligibilityRequested(ExternalEligibilityRequested),
        ExternalEligibilityOutsideDeal(ExternalEligibilityOutsideDeal),
        ExternalEligibilityInDeal(ExternalEligibilityInDeal),
        Aborted(Aborted),
    }
}

/// The eligibility transitions.
pub fn registry() -> Registry<EligibilityState, EligibilityEvent> {
    Registry::builder()
        .on(|s: &NotFound, e: &CreatedEligibilityWorkflow| WaitingForEligibilityCriteria {
            id: s.id,
            article: e.article.clone(),
        })
        .on(|s: &NotFound, e: &CreatedSubscriptionWorkflow| MustBeSubscription {
            id: s.id,
            article: e.article.clone(),
        })
        .on(|s: &WaitingForEligibilityCriteria, e: &EligibilityCriteriaCollected| {
            WaitingForEligibilityResult {
                id: s.id,
                article: s.article.clone(),
                matches: e.matches.clone(),
            }
        })
        .on(|s: &WaitingForEligibilityResult, _: &NoDealFound| WaitingForPublishingModelChoice {
            id: s.id,
            article: s.article.clone(),
            rejected_by_institution: false,
        })
        .on(|s: &WaitingForEligibilityResult, e: &DealFound| WaitingForAuthorConfirmation {
            id: s.id,
            article: s.article.clone(),
            matches: s.matches.clone(),
            contract: e.contract.clone(),
        })
        .on(|s: &WaitingForPublishingModelChoice, _: &AuthorChoseSubscription| {
            DecidedAsSubscription {
                id: s.id,
                article: s.article.clone(),
                rejected_by_institution: s.rejected_by_institution,
            }
        })
        .on(|s: &WaitingForAuthorConfirmation, _: &AuthorChoseSubscription| MustBeSubscription {
            id: s.id,
            article: s.article.clone(),
        })
        .on(|s: &WaitingForPublishingModelChoice, _: &AuthorChoseOa| DecidedAsOaOutsideDeal {
            id: s.id,
            article: s.article.clone(),
            rejected_by_institution: s.rejected_by_institution,
        })
        .on(|s: &WaitingForAuthorConfirmation, _: &ApprovalRequested| {
            WaitingForInstitutionApproval {
                id: s.id,
                article: s.article.clone(),
                contract: s.contract.clone(),
            }
        })
        .on(|s: &WaitingForInstitutionApproval, _: &ApprovedByInstitution| {
            WaitingToNotifyApprovalDecision {
                id: s.id,
                article: s.article.clone(),
                contract: s.contract.clone(),
            }
        })
        .on(|s: &WaitingForInstitutionApproval, _: &RejectedByInstitution| {
            WaitingToNotifyRejectionDecision {
                id: s.id,
                article: s.article.clone(),
                contract: s.contract.clone(),
            }
        })
        .on(|s: &WaitingToNotifyApprovalDecision, _: &AuthorNotifiedDecision| {
            DecidedAsOaInDeal { id: s.id }
        })
        .on(|s: &WaitingToNotifyRejectionDecision, _: &AuthorNotifiedDecision| {
            WaitingForPublishingModelChoice {
                id: s.id,
                article: s.article.clone(),
                rejected_by_institution: true,
            }
        })
        .on(|s: &WaitingForAuthorConfirmation, _: &ResetWorkflow| WaitingForEligibilityCriteria {
            id: s.id,
            article: s.article.clone(),
        })
        .on(|s: &WaitingForPublishingModelChoice, _: &ResetWorkflow| {
            WaitingForEligibilityCriteria {
                id: s.id,
                article: s.article.clone(),
            }
        })
        .on(|s: &DecidedAsSubscription, _: &PublishingModelChoiceReset| {
            WaitingForPublishingModelChoice {
                id: s.id,
                article: s.article.clone(),
                rejected_by_institution: s.rejected_by_institution,
            }
        })
        .on(|s: &DecidedAsOaOutsideDeal, _: &PublishingModelChoiceReset| {
            WaitingForPublishingModelChoice {
                id: s.id,
                article: s.article.clone(),
                rejected_by_institution: s.rejected_by_institution,
            }
        })
        .on(|s: &WaitingForEligibilityCriteria, _: &ExternalEligibilityRequested| {
            WaitingForExternalEligibilityDecision {
                id: s.id,
                article: s.article.clone(),
            }
        })
        .on(|s: &WaitingForExternalEligibilityDecision, _: &ExternalEligibilityOutsideDeal| {
            DecidedAsOaOutsideDeal {
                id: s.id,
                article: s.article.clone(),
                rejected_by_institution: false,
            }
        })
        .on(|s: &WaitingForExternalEligibilityDecision, _: &ExternalEligibilityInDeal| {
            DecidedAsOaInDeal { id: s.id }
        })
        .for_all_states(
            &[EligibilityStateKind::HasBeenAborted],
            |state: &EligibilityState, _: &Aborted| HasBeenAborted {
                id: state.entity_id(),
            },
        )
        .build()
        .expect("eligibility transitions are well formed")
}
