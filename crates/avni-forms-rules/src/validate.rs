//! Reading and structurally checking declarative rule sources

use crate::model::{
    Action, ActionType, Condition, DeclarativeRule, LhsKind, Operator, RuleClause, Scope,
};
use crate::{RuleError, RuleKind};
use serde_json::Value;

/// Read a rule source into rules, dropping blank template rules.
///
/// A missing source, `null`, blank text and an empty array all mean "no rule".
pub(crate) fn read_source(source: Option<&Value>) -> Result<Vec<DeclarativeRule>, RuleError> {
    let rules = match source {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(Vec::new()),
        Some(Value::String(text)) => {
            let parsed: Value =
                serde_json::from_str(text).map_err(|e| RuleError::InvalidJson(e.to_string()))?;
            return read_source(Some(&parsed));
        }
        Some(Value::Array(items)) if items.is_empty() => return Ok(Vec::new()),
        Some(value @ Value::Array(_)) => {
            serde_json::from_value::<Vec<DeclarativeRule>>(value.clone())
                .map_err(|e| RuleError::structure("Rules", e.to_string()))?
        }
        Some(_) => return Err(RuleError::structure("Rules", "expected a list of rules")),
    };
    Ok(rules.into_iter().filter(|r| !is_blank(r)).collect())
}

/// Untouched rule template: no clause content and no chosen action
fn is_blank(rule: &DeclarativeRule) -> bool {
    let blank_conditions = rule.conditions.iter().all(|c| {
        c.compound_rule
            .rules
            .iter()
            .all(|clause| *clause == RuleClause::default())
    });
    let blank_actions = rule.actions.iter().all(|a| a.action_type.is_none());
    blank_conditions && blank_actions
}

pub(crate) fn validate(rules: &[DeclarativeRule], kind: RuleKind) -> Result<(), RuleError> {
    for (index, rule) in rules.iter().enumerate() {
        let at = format!("Rule {}", index + 1);
        validate_rule(rule, kind, &at)?;
    }
    Ok(())
}

fn validate_rule(rule: &DeclarativeRule, kind: RuleKind, at: &str) -> Result<(), RuleError> {
    if rule.conditions.is_empty() {
        return Err(RuleError::structure(at, "at least one condition is required"));
    }
    for (index, condition) in rule.conditions.iter().enumerate() {
        validate_condition(condition, &format!("{}, condition {}", at, index + 1))?;
    }

    if rule.actions.is_empty() {
        return Err(RuleError::structure(at, "at least one action is required"));
    }
    for (index, action) in rule.actions.iter().enumerate() {
        validate_action(action, kind, &format!("{}, action {}", at, index + 1))?;
    }
    Ok(())
}

fn validate_condition(condition: &Condition, at: &str) -> Result<(), RuleError> {
    let clauses = &condition.compound_rule.rules;
    if clauses.is_empty() {
        return Err(RuleError::structure(at, "at least one rule is required"));
    }
    for (index, clause) in clauses.iter().enumerate() {
        validate_clause(clause, &format!("{}, rule {}", at, index + 1))?;
    }
    Ok(())
}

fn validate_clause(clause: &RuleClause, at: &str) -> Result<(), RuleError> {
    let lhs = clause
        .lhs
        .as_ref()
        .ok_or_else(|| RuleError::condition(at, "left-hand side is missing"))?;
    let lhs_type = lhs
        .lhs_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RuleError::condition(at, "left-hand side type is missing"))?;
    let kind = LhsKind::parse(lhs_type).ok_or_else(|| {
        RuleError::condition(at, format!("unknown left-hand side type '{}'", lhs_type))
    })?;

    if kind == LhsKind::Concept {
        if lhs.concept_uuid.as_deref().is_none_or(str::is_empty) {
            return Err(RuleError::condition(at, "concept is not selected"));
        }
        let scope = lhs
            .scope
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RuleError::condition(at, "scope is missing"))?;
        if Scope::parse(scope).is_none() {
            return Err(RuleError::condition(at, format!("unknown scope '{}'", scope)));
        }
    }

    let operator_name = clause
        .operator
        .as_deref()
        .filter(|o| !o.is_empty())
        .ok_or_else(|| RuleError::condition(at, "operator is missing"))?;
    let operator = Operator::parse(operator_name).ok_or_else(|| RuleError::UnknownOperator {
        at: at.to_string(),
        operator: operator_name.to_string(),
    })?;

    if operator.is_unary() {
        return Ok(());
    }
    let rhs = clause
        .rhs
        .as_ref()
        .ok_or_else(|| RuleError::condition(at, "right-hand side is missing"))?;
    if operator.takes_answers() {
        if rhs.answer_concept_uuids.is_empty() {
            return Err(RuleError::condition(at, "no answers selected"));
        }
    } else if rhs.value.as_ref().is_none_or(Value::is_null) {
        return Err(RuleError::condition(at, "right-hand side value is missing"));
    }
    Ok(())
}

fn validate_action(action: &Action, kind: RuleKind, at: &str) -> Result<(), RuleError> {
    let name = action
        .action_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RuleError::action(at, "action type is missing"))?;
    let action_type = ActionType::parse(name)
        .ok_or_else(|| RuleError::action(at, format!("unknown action type '{}'", name)))?;
    if !kind.allows(action_type) {
        return Err(RuleError::ActionNotAllowed {
            at: at.to_string(),
            action: name.to_string(),
            kind,
        });
    }

    match action_type {
        ActionType::Value => {
            if action.details.get("value").is_none_or(Value::is_null) {
                return Err(RuleError::action(at, "value is missing"));
            }
        }
        ActionType::SkipAnswers => {
            let empty = action
                .details
                .get("answersToSkip")
                .and_then(Value::as_array)
                .is_none_or(Vec::is_empty);
            if empty {
                return Err(RuleError::action(at, "no answers to skip"));
            }
        }
        ActionType::ValidationError | ActionType::FormValidationError => {
            if action.detail_str("validationError").is_none() {
                return Err(RuleError::action(at, "validation error message is missing"));
            }
        }
        ActionType::AddDecision => {
            if action.detail_str("conceptName").is_none() {
                return Err(RuleError::action(at, "decision concept is missing"));
            }
            if action.details.get("value").is_none_or(Value::is_null) {
                return Err(RuleError::action(at, "decision value is missing"));
            }
        }
        ActionType::ScheduleVisit => {
            for field in ["encounterType", "dateField"] {
                if action.detail_str(field).is_none() {
                    return Err(RuleError::action(at, format!("{} is missing", field)));
                }
            }
            for field in ["daysToSchedule", "daysToOverdue"] {
                if action.details.get(field).and_then(Value::as_i64).is_none() {
                    return Err(RuleError::action(at, format!("{} must be a whole number", field)));
                }
            }
        }
        _ => {}
    }
    Ok(())
}
