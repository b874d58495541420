//! Parsed model formula `"<depvars> ~ <regressors> [| <fixedeffects>]"`.

use std::fmt;
use std::str::FromStr;

use crate::error::FormulaError;

/// Separator between the regression part and the fixed-effect part.
const FIXEF_SEPARATOR: char = '|';

/// Separator between dependent variables and regressors.
const TILDE: char = '~';

/// Modifier appended to a sub-formula to suppress the intercept column.
pub const NO_INTERCEPT: &str = " - 1";

/// An immutable, decomposed model formula.
///
/// Dependent variables and fixed effects are `+`-joined lists of column
/// names. The regressor specification is kept verbatim and handed to the
/// design builder.
///
/// # Example
///
/// ```
/// use hdreg_formula::Formula;
///
/// let f: Formula = "y1 + y2 ~ x1 + x2 | firm + year".parse().unwrap();
/// assert_eq!(f.depvars(), ["y1", "y2"]);
/// assert_eq!(f.regressors(), "x1 + x2");
/// assert_eq!(f.fixef().unwrap(), ["firm", "year"]);
/// assert_eq!(f.regressor_formula(), "x1 + x2 - 1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    depvars: Vec<String>,
    regressors: String,
    fixef: Option<Vec<String>>,
}

impl Formula {
    /// Parses a formula string.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::Syntax`] if the string has no `~`, more than
    /// one `~` or `|`, or an empty dependent-variable, regressor or
    /// fixed-effect segment.
    pub fn parse(formula: &str) -> Result<Self, FormulaError> {
        let syntax = |reason: &str| FormulaError::Syntax {
            formula: formula.to_string(),
            reason: reason.to_string(),
        };

        if formula.matches(FIXEF_SEPARATOR).count() > 1 {
            return Err(syntax("more than one '|'"));
        }
        let (main, fixef_part) = match formula.split_once(FIXEF_SEPARATOR) {
            Some((main, fe)) => (main, Some(fe)),
            None => (formula, None),
        };

        match main.matches(TILDE).count() {
            0 => return Err(syntax("missing '~'")),
            1 => {}
            _ => return Err(syntax("more than one '~'")),
        }
        let (lhs, rhs) = main.split_once(TILDE).ok_or_else(|| syntax("missing '~'"))?;

        let depvars = split_terms(lhs).ok_or_else(|| syntax("empty dependent variable"))?;

        let regressors = rhs.trim();
        if regressors.is_empty() {
            return Err(syntax("empty regressor specification"));
        }

        let fixef = match fixef_part {
            Some(fe) => Some(split_terms(fe).ok_or_else(|| syntax("empty fixed effect"))?),
            None => None,
        };

        Ok(Self {
            depvars,
            regressors: regressors.to_string(),
            fixef,
        })
    }

    /// Returns the dependent-variable names, in order.
    pub fn depvars(&self) -> &[String] {
        &self.depvars
    }

    /// Returns the regressor specification as written.
    pub fn regressors(&self) -> &str {
        &self.regressors
    }

    /// Returns the fixed-effect names, if a `|` segment was present.
    pub fn fixef(&self) -> Option<&[String]> {
        self.fixef.as_deref()
    }

    /// Returns `true` if the formula has a fixed-effect segment.
    pub fn has_fixef(&self) -> bool {
        self.fixef.is_some()
    }

    /// Sub-formula for the outcome matrix (no intercept).
    pub fn depvar_formula(&self) -> String {
        format!("{}{NO_INTERCEPT}", self.depvars.join(" + "))
    }

    /// Sub-formula for the regressor matrix.
    ///
    /// The intercept is dropped when fixed effects are present, since the
    /// fixed-effect subspace absorbs it.
    pub fn regressor_formula(&self) -> String {
        if self.has_fixef() {
            format!("{}{NO_INTERCEPT}", self.regressors)
        } else {
            self.regressors.clone()
        }
    }

    /// Sub-formula for the fixed-effect group matrix (no intercept).
    pub fn fixef_formula(&self) -> Option<String> {
        self.fixef
            .as_ref()
            .map(|fe| format!("{}{NO_INTERCEPT}", fe.join(" + ")))
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.depvars.join(" + "), self.regressors)?;
        if let Some(fe) = &self.fixef {
            write!(f, " | {}", fe.join(" + "))?;
        }
        Ok(())
    }
}

/// Splits a `+`-joined list of names. Returns `None` if any term is empty.
fn split_terms(segment: &str) -> Option<Vec<String>> {
    let terms: Vec<String> = segment.split('+').map(|t| t.trim().to_string()).collect();
    if terms.iter().any(|t| t.is_empty()) {
        return None;
    }
    Some(terms)
}
