//! Small arithmetic expressions answered without the model.
//!
//! Only `<int> <op> <int>` with both operands at most [`MAX_OPERAND`] is
//! answered. Larger operands and division by zero fall through to the model.

use once_cell::sync::Lazy;
use regex::Regex;

/// Largest operand the cache will answer for.
pub const MAX_OPERAND: u32 = 100;

static DIRECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)\s*([+\-*/])\s*([0-9]+)$").unwrap());

static QUESTION_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^(?:que es|cuanto es|cual es el resultado de)?\s*([0-9]+)\s*([+\-*/])\s*([0-9]+)\s*\??$",
        r"(?i)^([0-9]+)\s*([+\-*/])\s*([0-9]+)\s*(?:es)?\s*\??$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Words that mark the message as a question.
const QUESTION_MARKERS: &[&str] = &["que", "cual", "cuanto", "resultado"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" => Some(Operator::Mul),
            "/" => Some(Operator::Div),
            _ => None,
        }
    }

    /// Symbol shown to the student.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "×",
            Operator::Div => "÷",
        }
    }
}

/// An expression extracted from a normalized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithmeticExpression {
    pub lhs: u32,
    pub op: Operator,
    pub rhs: u32,
}

/// Result of evaluating an [`ArithmeticExpression`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
        }
    }
}

impl ArithmeticExpression {
    /// Extract an expression from an already-normalized message.
    ///
    /// Tries the bare `a op b` form first, then the question-wrapped forms,
    /// taking the last three participating capture groups.
    pub fn extract(normalized: &str) -> Option<Self> {
        let groups: Vec<&str> = if let Some(caps) = DIRECT_RE.captures(normalized) {
            caps.iter().skip(1).flatten().map(|m| m.as_str()).collect()
        } else {
            QUESTION_RES.iter().find_map(|re| {
                let caps = re.captures(normalized)?;
                let groups: Vec<&str> = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
                (groups.len() >= 3).then_some(groups)
            })?
        };

        let [lhs, op, rhs] = groups.get(groups.len().checked_sub(3)?..)? else {
            return None;
        };
        Some(Self {
            lhs: lhs.parse().ok()?,
            op: Operator::parse(op)?,
            rhs: rhs.parse().ok()?,
        })
    }

    /// Both operands within the answerable range.
    pub fn in_bounds(&self) -> bool {
        self.lhs <= MAX_OPERAND && self.rhs <= MAX_OPERAND
    }

    /// Evaluate; `None` for division by zero.
    pub fn evaluate(&self) -> Option<Value> {
        let (a, b) = (i64::from(self.lhs), i64::from(self.rhs));
        match self.op {
            Operator::Add => Some(Value::Int(a + b)),
            Operator::Sub => Some(Value::Int(a - b)),
            Operator::Mul => Some(Value::Int(a * b)),
            Operator::Div if b == 0 => None,
            Operator::Div => Some(Value::Real(a as f64 / b as f64)),
        }
    }

    /// `"a sym b = result"`.
    pub fn equation(&self, value: Value) -> String {
        format!("{} {} {} = {}", self.lhs, self.op.symbol(), self.rhs, value)
    }
}

/// Answer `normalized` if it is a small arithmetic expression.
pub fn answer(normalized: &str) -> Option<String> {
    let expr = ArithmeticExpression::extract(normalized)?;
    if !expr.in_bounds() {
        return None;
    }
    let equation = expr.equation(expr.evaluate()?);

    if QUESTION_MARKERS.iter().any(|m| normalized.contains(m)) {
        Some(format!("¡Fácil! {equation} 😊"))
    } else {
        Some(equation)
    }
}
