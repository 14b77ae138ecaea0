//! Arithmetic formulas for 3D part geometry.
//!
//! Part positions and dimensions are stored either as plain numbers or as
//! expressions over a small set of variables (`width/2 + 0.01`,
//! `cornerDepth/2 - legLength/2`). Expressions are evaluated with evalexpr.

use std::collections::BTreeMap;

use evalexpr::{build_operator_tree, ContextWithMutableVariables, EvalexprError, HashMapContext, Value};
use serde::{Deserialize, Serialize};

use crate::error::FormulaError;

/// Named numeric variables available to formulas
pub type Variables = BTreeMap<String, f64>;

pub type FormulaResult = Result<f64, FormulaError>;

/// Number or expression as stored in a geometry part column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Formula {
    Number(f64),
    Expression(String),
}

impl From<f64> for Formula {
    fn from(value: f64) -> Self {
        Formula::Number(value)
    }
}

impl From<&str> for Formula {
    fn from(value: &str) -> Self {
        Formula::Expression(value.to_string())
    }
}

fn finite(value: f64, formula: &str) -> FormulaResult {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::NonFinite(formula.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormulaEvaluator {
    variables: Variables,
}

impl FormulaEvaluator {
    pub fn new(variables: Variables) -> Self {
        Self { variables }
    }

    pub fn evaluate(&self, formula: &Formula) -> FormulaResult {
        match formula {
            Formula::Number(value) => finite(*value, &value.to_string()),
            Formula::Expression(expression) => self.evaluate_str(expression),
        }
    }

    pub fn evaluate_str(&self, expression: &str) -> FormulaResult {
        let trimmed = expression.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            return finite(value, expression);
        }

        let tree = build_operator_tree(&promote_integer_literals(trimmed)).map_err(|e| {
            FormulaError::Parse {
                formula: expression.to_string(),
                message: e.to_string(),
            }
        })?;

        let context = self.context(expression)?;
        let value = tree.eval_with_context(&context).map_err(|e| match e {
            EvalexprError::VariableIdentifierNotFound(name) => FormulaError::UnknownVariable(name),
            other => FormulaError::Evaluation {
                formula: expression.to_string(),
                message: other.to_string(),
            },
        })?;

        let number = match value {
            Value::Float(f) => f,
            Value::Int(i) => i as f64,
            other => {
                return Err(FormulaError::NotANumber {
                    formula: expression.to_string(),
                    value: format!("{:?}", other),
                })
            }
        };

        finite(number, expression)
    }

    /// Evaluate a position or dimension triple in one go.
    pub fn evaluate_batch(&self, formulas: &[Formula]) -> Result<Vec<f64>, FormulaError> {
        formulas.iter().map(|f| self.evaluate(f)).collect()
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: f64) {
        self.variables.insert(name.into(), value);
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    fn context(&self, expression: &str) -> Result<HashMapContext, FormulaError> {
        let mut context: HashMapContext = HashMapContext::new();
        for (name, value) in &self.variables {
            context
                .set_value(name.clone(), Value::Float(*value))
                .map_err(|e| FormulaError::Evaluation {
                    formula: expression.to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(context)
    }
}

/// Rewrite bare integer literals as floats so `1/2` divides as `0.5`.
fn promote_integer_literals(expression: &str) -> String {
    let chars: Vec<char> = expression.chars().collect();
    let mut out = String::with_capacity(expression.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let in_identifier = i > 0 && (chars[i - 1].is_alphanumeric() || chars[i - 1] == '_' || chars[i - 1] == '.');
        if !c.is_ascii_digit() || in_identifier {
            out.push(c);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        out.extend(&chars[start..i]);

        let continues = chars
            .get(i)
            .is_some_and(|next| *next == '.' || next.is_alphanumeric() || *next == '_');
        if !continues {
            out.push_str(".0");
        }
    }

    out
}

/// Optional overrides for [`standard_variables`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableOptions {
    pub leg_length: Option<f64>,
    pub corner_depth: Option<f64>,
    pub plinth_height: Option<f64>,
    pub cabinet_height: Option<f64>,
    pub door_height: Option<f64>,
    pub is_wall_cabinet: bool,
}

/// Standard variable set for a component; inputs in cm, variables in metres.
pub fn standard_variables(
    width_cm: f64,
    height_cm: f64,
    depth_cm: Option<f64>,
    options: &VariableOptions,
) -> Variables {
    let width = width_cm / 100.0;
    let height = height_cm / 100.0;
    let depth = depth_cm.filter(|d| *d != 0.0).map_or(0.6, |d| d / 100.0);
    let default_corner_depth = if options.is_wall_cabinet { 0.4 } else { 0.6 };

    let mut vars = Variables::new();
    vars.insert("width".into(), width);
    vars.insert("height".into(), height);
    vars.insert("depth".into(), depth);
    vars.insert("plinthHeight".into(), options.plinth_height.unwrap_or(0.10));
    vars.insert("cabinetHeight".into(), options.cabinet_height.unwrap_or(height - 0.10));
    vars.insert("doorHeight".into(), options.door_height.unwrap_or(height - 0.12));
    vars.insert("legLength".into(), options.leg_length.unwrap_or(width));
    vars.insert("cornerDepth".into(), options.corner_depth.unwrap_or(default_corner_depth));
    vars.insert("isWallCabinet".into(), if options.is_wall_cabinet { 1.0 } else { 0.0 });
    vars
}

/// Evaluate a render condition of the form `flag` or `!flag`.
///
/// A variable missing from the set reads as 0.
pub fn evaluate_condition(condition: &str, variables: &Variables) -> bool {
    let condition = condition.trim();
    let (negated, name) = match condition.strip_prefix('!') {
        Some(rest) => (true, rest.trim()),
        None => (false, condition),
    };
    let set = variables.get(name).copied().unwrap_or(0.0) != 0.0;
    set != negated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> FormulaEvaluator {
        FormulaEvaluator::new(standard_variables(60.0, 90.0, Some(60.0), &VariableOptions::default()))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_numbers_pass_through() {
        let e = evaluator();
        assert_eq!(e.evaluate(&Formula::Number(1.25)).unwrap(), 1.25);
        assert_eq!(e.evaluate(&"0.5".into()).unwrap(), 0.5);
        assert_eq!(e.evaluate(&"-10".into()).unwrap(), -10.0);
    }

    #[test]
    fn test_basic_expressions() {
        let e = evaluator();
        assert!(approx(e.evaluate(&"width/2".into()).unwrap(), 0.3));
        assert!(approx(e.evaluate(&"width/2 + 0.01".into()).unwrap(), 0.31));
        assert!(approx(e.evaluate(&"(width + height) * 0.5".into()).unwrap(), 0.75));
        assert!(approx(e.evaluate(&"cornerDepth/2 - legLength/2".into()).unwrap(), 0.0));
    }

    #[test]
    fn test_unary_minus_and_precedence() {
        let e = evaluator();
        assert!(approx(e.evaluate(&"-height".into()).unwrap(), -0.9));
        assert!(approx(e.evaluate(&"-height/2 + plinthHeight".into()).unwrap(), -0.35));
        assert!(approx(e.evaluate(&"2 + 3 * 4".into()).unwrap(), 14.0));
    }

    #[test]
    fn test_integer_division_is_real_division() {
        let e = evaluator();
        assert!(approx(e.evaluate(&"1/2".into()).unwrap(), 0.5));
        assert!(approx(e.evaluate(&"7/2".into()).unwrap(), 3.5));
    }

    #[test]
    fn test_unknown_variable() {
        let err = evaluator().evaluate(&"width + bogus".into()).unwrap_err();
        assert_eq!(err, FormulaError::UnknownVariable("bogus".to_string()));
    }

    #[test]
    fn test_division_by_zero() {
        let err = evaluator().evaluate(&"width/0".into()).unwrap_err();
        assert!(matches!(err, FormulaError::NonFinite(_)));
    }

    #[test]
    fn test_non_finite_literals_are_rejected() {
        let e = FormulaEvaluator::new(Variables::new());
        for literal in ["NaN", "inf", "-infinity", " Infinity "] {
            assert!(
                matches!(e.evaluate(&literal.into()), Err(FormulaError::NonFinite(_))),
                "{}",
                literal
            );
        }
        assert!(matches!(
            e.evaluate(&Formula::Number(f64::NAN)),
            Err(FormulaError::NonFinite(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        let err = evaluator().evaluate(&"width / (".into()).unwrap_err();
        assert!(matches!(err, FormulaError::Parse { .. }));
    }

    #[test]
    fn test_batch_and_set_variable() {
        let mut e = evaluator();
        e.set_variable("gap", 0.02);
        let out = e
            .evaluate_batch(&["width".into(), Formula::Number(0.0), "gap * 2".into()])
            .unwrap();
        assert!(approx(out[0], 0.6));
        assert_eq!(out[1], 0.0);
        assert!(approx(out[2], 0.04));
        assert_eq!(e.variables().get("gap"), Some(&0.02));
    }

    #[test]
    fn test_promote_integer_literals() {
        assert_eq!(promote_integer_literals("width/2"), "width/2.0");
        assert_eq!(promote_integer_literals("0.5 + 10"), "0.5 + 10.0");
        assert_eq!(promote_integer_literals("leg2 * 3"), "leg2 * 3.0");
    }

    #[test]
    fn test_standard_variables() {
        let vars = standard_variables(90.0, 72.0, None, &VariableOptions {
            is_wall_cabinet: true,
            ..Default::default()
        });
        assert!(approx(vars["width"], 0.9));
        assert!(approx(vars["depth"], 0.6));
        assert!(approx(vars["cabinetHeight"], 0.62));
        assert!(approx(vars["doorHeight"], 0.60));
        assert!(approx(vars["legLength"], 0.9));
        assert!(approx(vars["cornerDepth"], 0.4));
        assert_eq!(vars["isWallCabinet"], 1.0);
    }

    #[test]
    fn test_evaluate_condition() {
        let vars = standard_variables(60.0, 90.0, None, &VariableOptions::default());
        assert!(evaluate_condition("!isWallCabinet", &vars));
        assert!(!evaluate_condition("isWallCabinet", &vars));
        assert!(!evaluate_condition("isSelected", &vars));
        assert!(evaluate_condition("!isSelected", &vars));
    }
}
