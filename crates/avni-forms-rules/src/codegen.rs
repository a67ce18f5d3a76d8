//! Rule code generation
//!
//! Generated code is a JavaScript arrow function taking `{params, imports}`,
//! built on the fluent `RuleCondition` builder of the rules runtime:
//!
//! ```text
//! 'use strict';
//! ({params, imports}) => {
//!   const individual = params.entity;
//!   const formElement = params.formElement;
//!   let visibility = false;
//!   ...
//!   const rule1Condition1 = new imports.rulesConfig.RuleCondition({individual, formElement})
//!     .when.valueInRegistration("c-1").containsAnswerConceptName("a-1").matches();
//!   if (rule1Condition1) {
//!     visibility = true;
//!   }
//!   return new imports.rulesConfig.FormElementStatus(formElement.uuid, visibility, value, answersToSkip, validationErrors);
//! };
//! ```
//!
//! Only validated rules reach this module, so missing pieces are skipped
//! rather than reported.

use crate::RuleKind;
use crate::model::{
    Action, ActionType, Condition, DeclarativeRule, LhsKind, Operator, RuleClause, Scope,
};
use serde_json::Value;

const DEFAULT_ENTITY: &str = "entity";

pub(crate) fn generate(rules: &[DeclarativeRule], kind: RuleKind, entity_name: &str) -> String {
    let entity = if entity_name.is_empty() {
        DEFAULT_ENTITY
    } else {
        entity_name
    };
    let mut w = CodeWriter::new();
    w.line("'use strict';");
    w.open("({params, imports}) => {");
    w.line(&format!("const {} = params.entity;", entity));
    prologue(&mut w, rules, kind);

    for (ri, rule) in rules.iter().enumerate() {
        let names = conditions(&mut w, rule, ri + 1, kind, entity);
        w.open(&format!("if ({}) {{", join_conditions(&rule.conditions, &names)));
        for action in &rule.actions {
            emit_action(&mut w, action, entity);
        }
        w.close("}");
    }

    epilogue(&mut w, kind);
    w.close("};");
    w.finish()
}

fn prologue(w: &mut CodeWriter, rules: &[DeclarativeRule], kind: RuleKind) {
    match kind {
        RuleKind::ViewFilter => {
            let shows = has_action(rules, ActionType::ShowFormElement);
            w.line("const formElement = params.formElement;");
            w.line(&format!("let visibility = {};", !shows));
            w.line("let value = null;");
            w.line("const answersToSkip = [];");
            w.line("const validationErrors = [];");
        }
        RuleKind::FormElementGroup => {
            let shows = has_action(rules, ActionType::ShowFormElementGroup);
            w.line("const formElementGroup = params.formElementGroup;");
            w.line(&format!("let visibility = {};", !shows));
        }
        RuleKind::FormValidation => {
            w.line("const validationResults = [];");
        }
        RuleKind::Decision => {
            w.line("const decisions = params.decisions;");
        }
        RuleKind::VisitSchedule => {
            w.line(
                "const scheduleBuilder = new imports.rulesConfig.VisitScheduleBuilder({entity: params.entity});",
            );
        }
    }
}

fn epilogue(w: &mut CodeWriter, kind: RuleKind) {
    match kind {
        RuleKind::ViewFilter => w.line(
            "return new imports.rulesConfig.FormElementStatus(formElement.uuid, visibility, value, answersToSkip, validationErrors);",
        ),
        RuleKind::FormElementGroup => w.line(
            "return formElementGroup.formElements.map(({uuid}) => new imports.rulesConfig.FormElementStatus(uuid, visibility, null));",
        ),
        RuleKind::FormValidation => w.line("return validationResults;"),
        RuleKind::Decision => w.line("return decisions;"),
        RuleKind::VisitSchedule => w.line("return scheduleBuilder.getAll();"),
    }
}

fn has_action(rules: &[DeclarativeRule], wanted: ActionType) -> bool {
    rules
        .iter()
        .flat_map(|r| &r.actions)
        .filter_map(|a| a.action_type.as_deref().and_then(ActionType::parse))
        .any(|a| a == wanted)
}

/// Emit one `const` per condition and return their names
fn conditions(
    w: &mut CodeWriter,
    rule: &DeclarativeRule,
    rule_number: usize,
    kind: RuleKind,
    entity: &str,
) -> Vec<String> {
    let context = match kind {
        RuleKind::ViewFilter => format!("{{{}, formElement}}", entity),
        RuleKind::FormElementGroup => format!("{{{}, formElementGroup}}", entity),
        _ => format!("{{{}}}", entity),
    };

    rule.conditions
        .iter()
        .enumerate()
        .map(|(ci, condition)| {
            let name = format!("rule{}Condition{}", rule_number, ci + 1);
            let chain = clause_chain(condition);
            w.line(&format!(
                "const {} = new imports.rulesConfig.RuleCondition({}).{}.matches();",
                name, context, chain
            ));
            name
        })
        .collect()
}

/// `when.a.op(x).and.when.b.op(y)`
fn clause_chain(condition: &Condition) -> String {
    let joiner = format!(".{}.", condition.compound_rule.conjunction.builder_word());
    condition
        .compound_rule
        .rules
        .iter()
        .map(clause)
        .collect::<Vec<_>>()
        .join(&joiner)
}

fn clause(clause: &RuleClause) -> String {
    let mut out = String::from("when.");
    if let Some(lhs) = &clause.lhs {
        let kind = lhs.lhs_type.as_deref().and_then(LhsKind::parse);
        match kind {
            Some(LhsKind::Concept) => {
                let accessor = lhs
                    .scope
                    .as_deref()
                    .and_then(Scope::parse)
                    .map(|s| s.accessor())
                    .unwrap_or("valueInEncounter");
                let uuid = lhs.concept_uuid.as_deref().unwrap_or_default();
                out.push_str(&format!("{}({})", accessor, js_string(uuid)));
            }
            Some(other) => out.push_str(other.accessor()),
            None => {}
        }
    }

    let Some(operator) = clause.operator.as_deref().and_then(Operator::parse) else {
        return out;
    };
    out.push('.');
    out.push_str(operator.builder_call());
    if operator.is_unary() {
        return out;
    }

    let args = match &clause.rhs {
        Some(rhs) if operator.takes_answers() => rhs
            .answer_concept_uuids
            .iter()
            .map(|u| js_string(u))
            .collect::<Vec<_>>()
            .join(", "),
        Some(rhs) => rhs
            .value
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_else(|| "null".to_string()),
        None => String::new(),
    };
    out.push_str(&format!("({})", args));
    out
}

/// Conditions are joined by the conjunction carried on the left operand
fn join_conditions(conditions: &[Condition], names: &[String]) -> String {
    let mut out = String::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            let conjunction = conditions
                .get(i - 1)
                .map(|c| c.conjunction)
                .unwrap_or_default();
            out.push_str(&format!(" {} ", conjunction.js_operator()));
        }
        out.push_str(name);
    }
    if out.is_empty() {
        out.push_str("false");
    }
    out
}

fn emit_action(w: &mut CodeWriter, action: &Action, entity: &str) {
    let Some(action_type) = action.action_type.as_deref().and_then(ActionType::parse) else {
        return;
    };
    let detail = |key: &str| {
        action
            .details
            .get(key)
            .map(Value::to_string)
            .unwrap_or_else(|| "null".to_string())
    };

    match action_type {
        ActionType::ShowFormElement | ActionType::ShowFormElementGroup => {
            w.line("visibility = true;")
        }
        ActionType::HideFormElement | ActionType::HideFormElementGroup => {
            w.line("visibility = false;")
        }
        ActionType::Value => w.line(&format!("value = {};", detail("value"))),
        ActionType::SkipAnswers => w.line(&format!(
            "answersToSkip.push(...{}.map((uuid) => formElement.getAnswerWithConceptUuid(uuid)));",
            detail("answersToSkip")
        )),
        ActionType::ValidationError => {
            w.line(&format!("validationErrors.push({});", detail("validationError")))
        }
        ActionType::FormValidationError => w.line(&format!(
            "validationResults.push(imports.common.createValidationError({}));",
            detail("validationError")
        )),
        ActionType::AddDecision => {
            let list = decision_list(entity);
            w.line(&format!(
                "decisions.{}.push({{name: {}, value: [].concat({})}});",
                list,
                detail("conceptName"),
                detail("value")
            ));
        }
        ActionType::ScheduleVisit => {
            let base = schedule_base(action, entity);
            w.open("scheduleBuilder.add({");
            w.line(&format!("name: {},", detail("encounterType")));
            w.line(&format!("encounterType: {},", detail("encounterType")));
            w.line(&format!(
                "earliestDate: imports.moment({}).add({}, 'days').toDate(),",
                base,
                detail("daysToSchedule")
            ));
            w.line(&format!(
                "maxDate: imports.moment({}).add({}, 'days').toDate()",
                base,
                detail("daysToOverdue")
            ));
            w.close("});");
        }
    }
}

/// Decision bucket for the entity the rule runs against
fn decision_list(entity: &str) -> &'static str {
    match entity {
        "individual" => "registrationDecisions",
        "programEnrolment" => "enrolmentDecisions",
        _ => "encounterDecisions",
    }
}

/// Date a visit is scheduled from: an entity property or an observation
fn schedule_base(action: &Action, entity: &str) -> String {
    let field = action.detail_str("dateField").unwrap_or("encounterDateTime");
    if field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        format!("{}.{}", entity, field)
    } else {
        format!("{}.getObservationReadableValue({})", entity, js_string(field))
    }
}

fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

struct CodeWriter {
    out: String,
    depth: usize,
}

impl CodeWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Conjunction;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rules(value: Value) -> Vec<DeclarativeRule> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_view_filter_code() {
        let rules = rules(json!([{
            "conditions": [{"compoundRule": {"rules": [{
                "lhs": {"type": "concept", "conceptUuid": "c-1", "scope": "registration"},
                "operator": "containsAnswerConceptName",
                "rhs": {"type": "answerConcept", "answerConceptUuids": ["a-1"]}
            }]}}],
            "actions": [{"actionType": "showFormElement"}]
        }]));
        let code = generate(&rules, RuleKind::ViewFilter, "individual");

        assert!(code.starts_with("'use strict';\n({params, imports}) => {\n"));
        assert!(code.contains("  const individual = params.entity;\n"));
        assert!(code.contains("  let visibility = false;\n"));
        assert!(code.contains(
            "const rule1Condition1 = new imports.rulesConfig.RuleCondition({individual, formElement}).when.valueInRegistration(\"c-1\").containsAnswerConceptName(\"a-1\").matches();"
        ));
        assert!(code.contains("  if (rule1Condition1) {\n    visibility = true;\n  }\n"));
        assert!(code.ends_with("};\n"));
    }

    #[test]
    fn test_clause_joining() {
        for conjunction in [Conjunction::And, Conjunction::Or] {
            let rules = rules(json!([{
                "conditions": [
                    {"compoundRule": {"conjunction": conjunction, "rules": [
                        {"lhs": {"type": "age"}, "operator": "greaterThan", "rhs": {"value": 5}},
                        {"lhs": {"type": "gender"}, "operator": "defined"}
                    ]}, "conjunction": "or"},
                    {"compoundRule": {"rules": [
                        {"lhs": {"type": "ageInYears"}, "operator": "lessThan", "rhs": {"value": 2}}
                    ]}}
                ],
                "actions": [{"actionType": "formValidationError", "details": {"validationError": "Too old"}}]
            }]));
            let code = generate(&rules, RuleKind::FormValidation, "");

            let word = conjunction.builder_word();
            assert!(code.contains(&format!(
                "RuleCondition({{entity}}).when.age.greaterThan(5).{}.when.gender.is.defined.matches();",
                word
            )));
            assert!(code.contains("if (rule1Condition1 || rule1Condition2) {"));
            assert!(code.contains(
                "validationResults.push(imports.common.createValidationError(\"Too old\"));"
            ));
        }
    }

    #[test]
    fn test_decision_bucket_follows_entity() {
        let rules = rules(json!([{
            "conditions": [{"compoundRule": {"rules": [
                {"lhs": {"type": "gender"}, "operator": "equals", "rhs": {"value": "Male"}}
            ]}}],
            "actions": [{"actionType": "addDecision", "details": {"conceptName": "Refer", "value": "Yes"}}]
        }]));

        let code = generate(&rules, RuleKind::Decision, "programEnrolment");
        assert!(code.contains("decisions.enrolmentDecisions.push({name: \"Refer\", value: [].concat(\"Yes\")});"));
        assert_eq!(decision_list("programEncounter"), "encounterDecisions");
    }

    #[test]
    fn test_schedule_visit() {
        let rules = rules(json!([{
            "conditions": [{"compoundRule": {"rules": [
                {"lhs": {"type": "encounterDate"}, "operator": "defined"}
            ]}}],
            "actions": [{"actionType": "scheduleVisit", "details": {
                "encounterType": "ANC", "dateField": "encounterDateTime",
                "daysToSchedule": 7, "daysToOverdue": 14
            }}]
        }]));
        let code = generate(&rules, RuleKind::VisitSchedule, "programEncounter");

        assert!(code.contains("earliestDate: imports.moment(programEncounter.encounterDateTime).add(7, 'days').toDate(),"));
        assert!(code.contains("maxDate: imports.moment(programEncounter.encounterDateTime).add(14, 'days').toDate()"));
        assert!(code.contains("return scheduleBuilder.getAll();"));
    }
}
