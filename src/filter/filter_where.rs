use super::types::{CompiledFilter, Condition, FieldPredicate, LeadField, SqlParam, SqlResult, TextSearch};

/// Renders a [`CompiledFilter`] as a parameterised Postgres `WHERE` clause.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Builds the clause body (without the `WHERE` keyword); `1=1` when unconstrained
    pub fn generate(filter: &CompiledFilter, starting_param_index: usize) -> SqlResult {
        let mut filter_where = Self::new(starting_param_index);
        let query = filter_where.build(filter);
        SqlResult { query, params: filter_where.param_values }
    }

    /// Full `SELECT` against `table`, newest first, capped at the filter limit
    pub fn select(table: &str, filter: &CompiledFilter) -> SqlResult {
        let SqlResult { query, params } = Self::generate(filter, 0);
        SqlResult {
            query: format!(
                "SELECT * FROM \"{}\" WHERE {} ORDER BY \"created_at\" DESC LIMIT {}",
                table,
                query,
                filter.limit()
            ),
            params,
        }
    }

    fn build(&mut self, filter: &CompiledFilter) -> String {
        let mut sql_conditions = vec![];
        for (field, condition) in filter.conditions() {
            sql_conditions.push(self.build_condition(*field, condition));
        }
        if let Some(search) = filter.search() {
            sql_conditions.push(self.build_search(search));
        }

        if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") }
    }

    fn build_condition(&mut self, field: LeadField, condition: &Condition) -> String {
        let quoted_column = format!("\"{}\"", field.column());
        match condition {
            Condition::Text(value) => format!("{} = {}", quoted_column, self.param(SqlParam::Text(value.clone()))),
            Condition::Flag(value) => format!("{} = {}", quoted_column, self.param(SqlParam::Bool(*value))),
            Condition::Number(predicate) => self.build_predicate(&quoted_column, predicate, |v| SqlParam::Number(*v)),
            Condition::Timestamp(predicate) => self.build_predicate(&quoted_column, predicate, |v| SqlParam::Timestamp(*v)),
        }
    }

    fn build_predicate<T>(&mut self, column: &str, predicate: &FieldPredicate<T>, to_param: impl Fn(&T) -> SqlParam) -> String {
        match predicate {
            FieldPredicate::Equals(v) => format!("{} = {}", column, self.param(to_param(v))),
            FieldPredicate::GreaterThan(v) => format!("{} > {}", column, self.param(to_param(v))),
            FieldPredicate::LessThan(v) => format!("{} < {}", column, self.param(to_param(v))),
            FieldPredicate::Interval { gt, lt } => {
                let low = self.param(to_param(gt));
                let high = self.param(to_param(lt));
                format!("({} > {} AND {} < {})", column, low, column, high)
            }
            FieldPredicate::Range { min, max } => {
                let low = self.param(to_param(min));
                let high = self.param(to_param(max));
                format!("{} BETWEEN {} AND {}", column, low, high)
            }
        }
    }

    fn build_search(&mut self, search: &TextSearch) -> String {
        // One parameter, referenced by every column
        let pattern = self.param(SqlParam::Text(format!("%{}%", escape_like(search.term()))));
        let parts: Vec<String> = search
            .columns()
            .iter()
            .map(|column| format!("\"{}\" ILIKE {}", column, pattern))
            .collect();
        format!("({})", parts.join(" OR "))
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escapes LIKE wildcards so the term is matched literally
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
