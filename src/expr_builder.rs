//! Build circuit evaluators from mathematical expressions.

use crate::error::{Result, SearchError};
use crate::search::{Env, Outputs};

/// Builder that assembles an evaluator closure for
/// [`RclCalc::search`](crate::RclCalc::search) from per-target expression
/// strings.
///
/// Expressions may reference any fixed parameter or component identifier as
/// a variable, plus the [functions meval supports](https://docs.rs/meval).
#[derive(Default)]
pub struct EvalBuilder {
    exprs: Vec<(String, meval::Expr)>,
}

impl EvalBuilder {
    /// Init a new builder.
    pub fn new() -> Self {
        EvalBuilder { exprs: Vec::new() }
    }

    /// Add the governing equation for one target quantity.
    ///
    /// # Panics
    /// Panics if `expr` is not a parseable expression.
    pub fn target(mut self, id: &str, expr: &str) -> Self {
        let parsed = expr
            .parse::<meval::Expr>()
            .expect("Err: target equation must be a valid expression");
        self.exprs.push((id.to_string(), parsed));
        self
    }

    /// Finishes the building and converts the struct into a function
    /// suitable to be passed to a search pass.
    pub fn finish(self) -> impl Fn(&Env, &mut Outputs) -> Result<()> {
        move |env: &Env, out: &mut Outputs| {
            let mut ctx = meval::Context::new();
            for (id, value) in env.fixed_params() {
                ctx.var(id, value);
            }
            for (id, value) in env.component_values() {
                ctx.var(id, value);
            }
            for (id, expr) in &self.exprs {
                let value = expr
                    .eval_with_context(&ctx)
                    .map_err(|e| SearchError::evaluator(format!("{}: {}", id, e)))?;
                out.set(id, value)?;
            }
            Ok(())
        }
    }
}
