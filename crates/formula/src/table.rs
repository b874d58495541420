//! In-memory column table with a minimal additive-term design builder.

use ndarray::{Array2, Axis};

use crate::builder::{DesignBuilder, MissingPolicy, ModelMatrix};
use crate::error::FormulaError;

/// Name given to the implicit intercept column.
pub const INTERCEPT: &str = "Intercept";

/// A table of named `f64` columns sharing one row count.
///
/// Categorical columns (fixed effects, clusters) are stored as numeric
/// labels; any finite value identifies a group.
///
/// As a [`DesignBuilder`], the table understands only additive terms:
/// column names joined by `+`, the intercept `1`, and the no-intercept
/// modifiers `0` and `- 1`. Interactions, transforms and other formula
/// grammar are rejected.
///
/// # Example
///
/// ```
/// use hdreg_formula::{ColumnTable, DesignBuilder, MissingPolicy};
///
/// let table = ColumnTable::new()
///     .with_column("y", vec![1.0, 2.0, 3.0]).unwrap()
///     .with_column("x", vec![0.5, 1.5, 2.5]).unwrap();
///
/// let m = table.build("x", MissingPolicy::Keep).unwrap();
/// assert_eq!(m.names(), ["Intercept", "x"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTable {
    columns: Vec<(String, Vec<f64>)>,
    n_rows: usize,
}

impl ColumnTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column and returns the table (builder style).
    ///
    /// # Errors
    ///
    /// See [`ColumnTable::insert`].
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, FormulaError> {
        self.insert(name, values)?;
        Ok(self)
    }

    /// Adds a column.
    ///
    /// The first column fixes the row count of the table.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::DuplicateColumn`] if the name is taken and
    /// [`FormulaError::ColumnLength`] if the length differs from the table.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), FormulaError> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(FormulaError::DuplicateColumn { name });
        }
        if !self.columns.is_empty() && values.len() != self.n_rows {
            return Err(FormulaError::ColumnLength {
                name,
                len: values.len(),
                expected: self.n_rows,
            });
        }
        self.n_rows = values.len();
        self.columns.push((name, values));
        Ok(())
    }

    /// Overwrites the values of an existing column.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError::UnknownColumn`] if there is no such column and
    /// [`FormulaError::ColumnLength`] if the length differs from the table.
    pub fn replace(&mut self, name: &str, values: Vec<f64>) -> Result<(), FormulaError> {
        if values.len() != self.n_rows {
            return Err(FormulaError::ColumnLength {
                name: name.to_string(),
                len: values.len(),
                expected: self.n_rows,
            });
        }
        let slot = self
            .columns
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| FormulaError::UnknownColumn {
                name: name.to_string(),
            })?;
        slot.1 = values;
        Ok(())
    }

    /// Returns the column called `name`, if present.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Returns the column names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Returns the number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Returns the number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }
}

impl DesignBuilder for ColumnTable {
    fn build(&self, formula: &str, missing: MissingPolicy) -> Result<ModelMatrix, FormulaError> {
        let spec = parse_terms(formula)?;

        let mut names: Vec<String> = Vec::new();
        let mut sources: Vec<Option<&[f64]>> = Vec::new();
        if spec.intercept {
            names.push(INTERCEPT.to_string());
            sources.push(None);
        }
        for term in &spec.terms {
            let col = self
                .column(term)
                .ok_or_else(|| FormulaError::UnknownColumn { name: term.clone() })?;
            names.push(term.clone());
            sources.push(Some(col));
        }

        let mut values = Array2::<f64>::zeros((self.n_rows, names.len()));
        for (j, source) in sources.iter().enumerate() {
            let mut col = values.column_mut(j);
            match source {
                None => col.fill(1.0),
                Some(data) => {
                    for (dst, &v) in col.iter_mut().zip(data.iter()) {
                        *dst = v;
                    }
                }
            }
        }

        if missing == MissingPolicy::Drop {
            let keep: Vec<usize> = values
                .axis_iter(Axis(0))
                .enumerate()
                .filter(|(_, row)| row.iter().all(|v| v.is_finite()))
                .map(|(i, _)| i)
                .collect();
            values = values.select(Axis(0), &keep);
        }

        ModelMatrix::new(values, names)
    }
}

/// Additive terms of a one-sided sub-formula.
#[derive(Debug, PartialEq)]
struct TermSpec {
    intercept: bool,
    terms: Vec<String>,
}

/// Parses `term (+|- term)*` into column names and an intercept flag.
fn parse_terms(formula: &str) -> Result<TermSpec, FormulaError> {
    let syntax = |reason: String| FormulaError::Syntax {
        formula: formula.to_string(),
        reason,
    };

    let mut intercept = true;
    let mut terms: Vec<String> = Vec::new();

    let mut sign = '+';
    let mut current = String::new();
    let mut pieces: Vec<(char, String)> = Vec::new();
    for ch in formula.chars() {
        match ch {
            '+' | '-' => {
                let token = current.trim().to_string();
                if token.is_empty() {
                    // a leading sign is allowed, consecutive operators are not
                    if !pieces.is_empty() || sign != '+' {
                        return Err(syntax("missing term between operators".to_string()));
                    }
                } else {
                    pieces.push((sign, token));
                }
                sign = ch;
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    let last = current.trim().to_string();
    if last.is_empty() {
        return Err(syntax("formula ends without a term".to_string()));
    }
    pieces.push((sign, last));

    for (sign, token) in pieces {
        match (sign, token.as_str()) {
            ('+', "1") => intercept = true,
            ('+', "0") | ('-', "1") => intercept = false,
            ('-', other) => return Err(syntax(format!("cannot remove term {other:?}"))),
            (_, name) => {
                if !is_column_name(name) {
                    return Err(syntax(format!("unsupported term {name:?}")));
                }
                if !terms.iter().any(|t| t == name) {
                    terms.push(name.to_string());
                }
            }
        }
    }

    Ok(TermSpec { intercept, terms })
}

fn is_column_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}
