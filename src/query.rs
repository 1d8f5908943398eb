//! Match predicates over the news corpus.
//!
//! A [`Predicate`] is built once per request and compiled to SQL in one
//! place; the count and fetch paths consume the same compiled clause and
//! parameter list, so the two can never disagree about what matches.

/// A composable condition over article fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every article.
    All,
    /// Case-insensitive substring match of any keyword against the title.
    /// Keywords are literal text; regex metacharacters have no meaning.
    TitleAnyKeyword(Vec<String>),
    /// Case-sensitive equality on the source name.
    SourceEquals(String),
    /// Both sides must match.
    And(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// AND-composition with `All` as the identity.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::All, p) | (p, Predicate::All) => p,
            (a, b) => Predicate::And(Box::new(a), Box::new(b)),
        }
    }

    /// Compiles to a SQL boolean clause plus its positional parameters,
    /// in bind order.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut params = Vec::new();
        let clause = self.write_clause(&mut params);
        (clause, params)
    }

    fn write_clause(&self, params: &mut Vec<String>) -> String {
        match self {
            Predicate::All => "1 = 1".to_string(),
            Predicate::TitleAnyKeyword(keywords) => {
                // An empty keyword set matches nothing. Assemblers
                // short-circuit before building one; this keeps a stray
                // empty OR from quietly matching the whole corpus.
                if keywords.is_empty() {
                    return "0 = 1".to_string();
                }
                let terms = vec!["instr(lower(title), lower(?)) > 0"; keywords.len()];
                params.extend(keywords.iter().cloned());
                format!("({})", terms.join(" OR "))
            }
            Predicate::SourceEquals(source) => {
                params.push(source.clone());
                "source = ?".to_string()
            }
            Predicate::And(left, right) => {
                let left = left.write_clause(params);
                let right = right.write_clause(params);
                format!("({left} AND {right})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_everything() {
        let (clause, params) = Predicate::All.to_sql();
        assert_eq!(clause, "1 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_single_keyword() {
        let predicate = Predicate::TitleAnyKeyword(vec!["oil".to_string()]);
        let (clause, params) = predicate.to_sql();
        assert_eq!(clause, "(instr(lower(title), lower(?)) > 0)");
        assert_eq!(params, vec!["oil"]);
    }

    #[test]
    fn test_keywords_combine_with_or() {
        let predicate =
            Predicate::TitleAnyKeyword(vec!["oil".to_string(), "gas".to_string()]);
        let (clause, params) = predicate.to_sql();
        assert_eq!(
            clause,
            "(instr(lower(title), lower(?)) > 0 OR instr(lower(title), lower(?)) > 0)"
        );
        assert_eq!(params, vec!["oil", "gas"]);
    }

    #[test]
    fn test_empty_keyword_set_matches_nothing() {
        let (clause, params) = Predicate::TitleAnyKeyword(vec![]).to_sql();
        assert_eq!(clause, "0 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_source_equality() {
        let (clause, params) = Predicate::SourceEquals("Reuters".to_string()).to_sql();
        assert_eq!(clause, "source = ?");
        assert_eq!(params, vec!["Reuters"]);
    }

    #[test]
    fn test_and_composition_binds_left_to_right() {
        let predicate = Predicate::TitleAnyKeyword(vec!["oil".to_string()])
            .and(Predicate::SourceEquals("Reuters".to_string()));
        let (clause, params) = predicate.to_sql();
        assert_eq!(
            clause,
            "((instr(lower(title), lower(?)) > 0) AND source = ?)"
        );
        assert_eq!(params, vec!["oil", "Reuters"]);
    }

    #[test]
    fn test_all_is_identity_under_and() {
        let keyword = Predicate::TitleAnyKeyword(vec!["oil".to_string()]);
        assert_eq!(Predicate::All.and(keyword.clone()), keyword);
        assert_eq!(keyword.clone().and(Predicate::All), keyword);
        assert_eq!(Predicate::All.and(Predicate::All), Predicate::All);
    }

    #[test]
    fn test_count_and_fetch_share_one_compilation() {
        let predicate = Predicate::TitleAnyKeyword(vec!["fed".to_string()])
            .and(Predicate::SourceEquals("Bloomberg".to_string()));
        // Two calls over the same value yield identical clause and params.
        assert_eq!(predicate.to_sql(), predicate.to_sql());
    }
}
