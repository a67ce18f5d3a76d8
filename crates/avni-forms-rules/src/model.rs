//! Declarative rule structures
//!
//! A declarative rule source is a JSON array of rules. Each rule pairs a list
//! of conditions with the actions taken when they hold:
//!
//! ```json
//! [{
//!   "conditions": [{
//!     "compoundRule": {
//!       "rules": [{
//!         "lhs": {"type": "concept", "conceptUuid": "...", "scope": "encounter"},
//!         "operator": "containsAnswerConceptName",
//!         "rhs": {"type": "answerConcept", "answerConceptUuids": ["..."]}
//!       }],
//!       "conjunction": "and"
//!     }
//!   }],
//!   "actions": [{"actionType": "showFormElement"}]
//! }]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One rule: when the conditions hold, the actions apply
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarativeRule {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A compound rule plus how it joins the next condition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub compound_rule: CompoundRule,
    #[serde(default)]
    pub conjunction: Conjunction,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundRule {
    #[serde(default)]
    pub rules: Vec<RuleClause>,
    #[serde(default)]
    pub conjunction: Conjunction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    /// Method name of the fluent condition builder
    pub fn builder_word(&self) -> &'static str {
        match self {
            Conjunction::And => "and",
            Conjunction::Or => "or",
        }
    }

    pub fn js_operator(&self) -> &'static str {
        match self {
            Conjunction::And => "&&",
            Conjunction::Or => "||",
        }
    }
}

/// `lhs operator rhs`. The operator stays textual until validation so an
/// unknown operator is reported with its position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleClause {
    #[serde(default)]
    pub lhs: Option<Lhs>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub rhs: Option<Rhs>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lhs {
    #[serde(rename = "type", default)]
    pub lhs_type: Option<String>,
    #[serde(default)]
    pub concept_name: Option<String>,
    #[serde(default)]
    pub concept_uuid: Option<String>,
    #[serde(default)]
    pub concept_data_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub encounter_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rhs {
    #[serde(rename = "type", default)]
    pub rhs_type: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub answer_concept_names: Vec<String>,
    #[serde(default)]
    pub answer_concept_uuids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl Action {
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Left-hand side subjects a clause can test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LhsKind {
    Concept,
    Gender,
    Age,
    AgeInDays,
    AgeInWeeks,
    AgeInMonths,
    AgeInYears,
    RegistrationDate,
    EnrolmentDate,
    EncounterDate,
    AddressType,
    LowestAddressLevel,
}

impl LhsKind {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "concept" => Self::Concept,
            "gender" => Self::Gender,
            "age" => Self::Age,
            "ageInDays" => Self::AgeInDays,
            "ageInWeeks" => Self::AgeInWeeks,
            "ageInMonths" => Self::AgeInMonths,
            "ageInYears" => Self::AgeInYears,
            "registrationDate" => Self::RegistrationDate,
            "enrolmentDate" => Self::EnrolmentDate,
            "encounterDate" => Self::EncounterDate,
            "addressType" => Self::AddressType,
            "lowestAddressLevel" => Self::LowestAddressLevel,
            _ => return None,
        })
    }

    /// Builder accessor for every kind except concepts, which need a scope
    pub fn accessor(&self) -> &'static str {
        match self {
            Self::Concept => "",
            Self::Gender => "gender",
            Self::Age => "age",
            Self::AgeInDays => "ageInDays",
            Self::AgeInWeeks => "ageInWeeks",
            Self::AgeInMonths => "ageInMonths",
            Self::AgeInYears => "ageInYears",
            Self::RegistrationDate => "registrationDate",
            Self::EnrolmentDate => "enrolmentDate",
            Self::EncounterDate => "encounterDate",
            Self::AddressType => "addressType",
            Self::LowestAddressLevel => "lowestAddressLevel",
        }
    }
}

/// Where a concept's value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Registration,
    Enrolment,
    Exit,
    Encounter,
    EntireEnrolment,
    LatestInEnrolment,
    LatestInPreviousEncounters,
    LatestInAllVisits,
    LastEncounter,
    CancelEncounter,
    ChecklistItem,
}

impl Scope {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "registration" => Self::Registration,
            "enrolment" => Self::Enrolment,
            "exit" => Self::Exit,
            "encounter" => Self::Encounter,
            "entireEnrolment" => Self::EntireEnrolment,
            "latestInEnrolment" => Self::LatestInEnrolment,
            "latestInPreviousEncounters" => Self::LatestInPreviousEncounters,
            "latestInAllVisits" => Self::LatestInAllVisits,
            "lastEncounter" => Self::LastEncounter,
            "cancelEncounter" => Self::CancelEncounter,
            "checklistItem" => Self::ChecklistItem,
            _ => return None,
        })
    }

    pub fn accessor(&self) -> &'static str {
        match self {
            Self::Registration => "valueInRegistration",
            Self::Enrolment => "valueInEnrolment",
            Self::Exit => "valueInExit",
            Self::Encounter => "valueInEncounter",
            Self::EntireEnrolment => "valueInEntireEnrolment",
            Self::LatestInEnrolment => "latestValueInEntireEnrolment",
            Self::LatestInPreviousEncounters => "latestValueInPreviousEncounters",
            Self::LatestInAllVisits => "latestValueInAllEncounters",
            Self::LastEncounter => "valueInLastEncounter",
            Self::CancelEncounter => "valueInCancelEncounter",
            Self::ChecklistItem => "valueInChecklistItem",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Defined,
    NotDefined,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    ContainsAnswerConceptName,
    NotContainsAnswerConceptName,
    ContainsAnyAnswerConceptName,
    ContainsAllAnswerConceptName,
}

impl Operator {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "defined" => Self::Defined,
            "notDefined" => Self::NotDefined,
            "equals" => Self::Equals,
            "notEquals" => Self::NotEquals,
            "lessThan" => Self::LessThan,
            "lessThanOrEqualTo" => Self::LessThanOrEqualTo,
            "greaterThan" => Self::GreaterThan,
            "greaterThanOrEqualTo" => Self::GreaterThanOrEqualTo,
            "containsAnswerConceptName" => Self::ContainsAnswerConceptName,
            "notContainsAnswerConceptName" => Self::NotContainsAnswerConceptName,
            "containsAnyAnswerConceptName" => Self::ContainsAnyAnswerConceptName,
            "containsAllAnswerConceptName" => Self::ContainsAllAnswerConceptName,
            _ => return None,
        })
    }

    /// Operators that take no right-hand side
    pub fn is_unary(&self) -> bool {
        matches!(self, Self::Defined | Self::NotDefined)
    }

    /// Operators whose right-hand side is a list of answer concepts
    pub fn takes_answers(&self) -> bool {
        matches!(
            self,
            Self::ContainsAnswerConceptName
                | Self::NotContainsAnswerConceptName
                | Self::ContainsAnyAnswerConceptName
                | Self::ContainsAllAnswerConceptName
        )
    }

    /// Builder call suffix, without arguments
    pub fn builder_call(&self) -> &'static str {
        match self {
            Self::Defined => "is.defined",
            Self::NotDefined => "is.notDefined",
            Self::Equals => "equals",
            Self::NotEquals => "not.equals",
            Self::LessThan => "lessThan",
            Self::LessThanOrEqualTo => "lessThanOrEqualTo",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanOrEqualTo => "greaterThanOrEqualTo",
            Self::ContainsAnswerConceptName => "containsAnswerConceptName",
            Self::NotContainsAnswerConceptName => "not.containsAnswerConceptName",
            Self::ContainsAnyAnswerConceptName => "containsAnyAnswerConceptName",
            Self::ContainsAllAnswerConceptName => "containsAllAnswerConceptName",
        }
    }
}

/// Things a rule can do once its conditions hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    ShowFormElement,
    HideFormElement,
    Value,
    SkipAnswers,
    ValidationError,
    ShowFormElementGroup,
    HideFormElementGroup,
    FormValidationError,
    AddDecision,
    ScheduleVisit,
}

impl ActionType {
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "showFormElement" => Self::ShowFormElement,
            "hideFormElement" => Self::HideFormElement,
            "value" => Self::Value,
            "skipAnswers" => Self::SkipAnswers,
            "validationError" => Self::ValidationError,
            "showFormElementGroup" => Self::ShowFormElementGroup,
            "hideFormElementGroup" => Self::HideFormElementGroup,
            "formValidationError" => Self::FormValidationError,
            "addDecision" => Self::AddDecision,
            "scheduleVisit" => Self::ScheduleVisit,
            _ => return None,
        })
    }
}
