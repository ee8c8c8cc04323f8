//! SQL emitter
//!
//! Renders a [`Query`] as ANSI SQL, either with literals escaped inline or
//! with literals bound as positional parameters. Every identifier is quoted.

use crate::plan::{
    AggregateExpr, Column, Expr, Literal, Projection, Query, SortDirection, Source,
};
use super::error::EmitError;

/// Positional parameter syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?` (SQLite, MySQL, ODBC)
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Dollar,
}

/// SQL text plus the values bound to its placeholders, in order
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub params: Vec<Literal>,
}

/// Render a query as SQL text with every literal escaped inline.
pub fn render_sql(query: &Query) -> Result<String, EmitError> {
    let mut writer = SqlWriter { binding: None };
    writer.emit_query(query, 0)
}

/// Render a query as SQL text with predicate literals bound as parameters.
pub fn render_parameterized(query: &Query, placeholder: Placeholder) -> Result<BoundStatement, EmitError> {
    let mut writer = SqlWriter {
        binding: Some((placeholder, Vec::new())),
    };
    let sql = writer.emit_query(query, 0)?;
    let params = writer.binding.map(|(_, params)| params).unwrap_or_default();
    Ok(BoundStatement { sql, params })
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

struct SqlWriter {
    binding: Option<(Placeholder, Vec<Literal>)>,
}

impl SqlWriter {
    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn emit_query(&mut self, query: &Query, indent: usize) -> Result<String, EmitError> {
        let p = pad(indent);
        let mut lines = Vec::new();

        let select = if query.projections.is_empty() {
            "*".to_string()
        } else {
            query
                .projections
                .iter()
                .map(|proj| self.emit_projection(proj))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ")
        };
        lines.push(format!("{p}SELECT {select}"));
        lines.push(format!("{p}FROM {}", self.emit_source(&query.source, indent)?));

        if let Some(filter) = &query.filter {
            lines.push(format!("{p}WHERE {}", self.emit_expr(filter)?));
        }

        if !query.group_by.is_empty() {
            let cols: Vec<String> = query.group_by.iter().map(emit_column).collect();
            lines.push(format!("{p}GROUP BY {}", cols.join(", ")));
        }

        if !query.order_by.is_empty() {
            let keys: Vec<String> = query
                .order_by
                .iter()
                .map(|k| {
                    let dir = match k.direction {
                        SortDirection::Ascending => "ASC",
                        SortDirection::Descending => "DESC",
                    };
                    format!("{} {}", emit_column(&k.column), dir)
                })
                .collect();
            lines.push(format!("{p}ORDER BY {}", keys.join(", ")));
        }

        if let Some(limit) = query.limit {
            lines.push(format!("{p}LIMIT {limit}"));
        }
        if let Some(offset) = query.offset {
            lines.push(format!("{p}OFFSET {offset}"));
        }

        Ok(lines.join("\n"))
    }

    fn emit_source(&mut self, source: &Source, indent: usize) -> Result<String, EmitError> {
        let p = pad(indent);
        match source {
            Source::Table { name, alias } => {
                let table: Vec<String> = name.split('.').map(quote_identifier).collect();
                Ok(format!("{} AS {}", table.join("."), quote_identifier(alias)))
            }
            Source::Statement { sql, alias } => {
                if sql.trim().is_empty() {
                    return Err(EmitError::InvalidPlan("empty source statement".to_string()));
                }
                Ok(format!(
                    "(\n{}{}\n{p}) AS {}",
                    pad(indent + 1),
                    sql.trim(),
                    quote_identifier(alias)
                ))
            }
            Source::Derived { query, alias } => {
                let inner = self.emit_query(query, indent + 1)?;
                Ok(format!("(\n{inner}\n{p}) AS {}", quote_identifier(alias)))
            }
        }
    }

    fn emit_projection(&mut self, proj: &Projection) -> Result<String, EmitError> {
        match proj {
            Projection::Column { column, alias } => match alias {
                Some(alias) if alias != &column.name => {
                    Ok(format!("{} AS {}", emit_column(column), quote_identifier(alias)))
                }
                _ => Ok(emit_column(column)),
            },
            Projection::Aggregate(agg) => self.emit_aggregate_expr(agg),
        }
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    fn emit_expr(&mut self, expr: &Expr) -> Result<String, EmitError> {
        match expr {
            Expr::Column(col) => Ok(emit_column(col)),
            Expr::Literal(lit) => self.emit_bound_literal(lit),
            Expr::BinaryOp { left, op, right } => {
                let l = self.emit_expr(left)?;
                let r = self.emit_expr(right)?;
                Ok(format!("{} {} {}", l, op.as_str(), r))
            }
            Expr::Between { expr, low, high } => {
                let e = self.emit_expr(expr)?;
                let lo = self.emit_expr(low)?;
                let hi = self.emit_expr(high)?;
                Ok(format!("{} BETWEEN {} AND {}", e, lo, hi))
            }
            Expr::And(exprs) => {
                if exprs.is_empty() {
                    return Ok("TRUE".to_string());
                }
                let parts = exprs
                    .iter()
                    .map(|e| self.emit_expr(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("({})", parts.join(" AND ")))
            }
            Expr::IsNotNull(inner) => Ok(format!("{} IS NOT NULL", self.emit_expr(inner)?)),
        }
    }

    fn emit_bound_literal(&mut self, lit: &Literal) -> Result<String, EmitError> {
        match &mut self.binding {
            Some((placeholder, params)) => {
                validate_literal(lit)?;
                params.push(lit.clone());
                Ok(match placeholder {
                    Placeholder::Question => "?".to_string(),
                    Placeholder::Dollar => format!("${}", params.len()),
                })
            }
            None => emit_literal(lit),
        }
    }

    fn emit_aggregate_expr(&mut self, agg: &AggregateExpr) -> Result<String, EmitError> {
        // aggregate arguments are compiler-generated; literals stay inline
        let inner = match &agg.expr {
            Expr::Literal(lit) => emit_literal(lit)?,
            other => self.emit_expr(other)?,
        };
        Ok(format!(
            "{}({}) AS {}",
            agg.func.sql_function(),
            inner,
            quote_identifier(&agg.alias)
        ))
    }
}

fn emit_column(col: &Column) -> String {
    if col.table.is_empty() {
        quote_identifier(&col.name)
    } else {
        format!("{}.{}", quote_identifier(&col.table), quote_identifier(&col.name))
    }
}

fn validate_literal(lit: &Literal) -> Result<(), EmitError> {
    match lit {
        Literal::Float(f) if !f.is_finite() => {
            Err(EmitError::InvalidLiteral(format!("non-finite number {}", f)))
        }
        Literal::String(s) if s.contains('\0') => {
            Err(EmitError::InvalidLiteral("string contains NUL".to_string()))
        }
        _ => Ok(()),
    }
}

fn emit_literal(lit: &Literal) -> Result<String, EmitError> {
    validate_literal(lit)?;
    Ok(match lit {
        Literal::Null => "NULL".to_string(),
        Literal::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => format!("{}", f),
        Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
    })
}
