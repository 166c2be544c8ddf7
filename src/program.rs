//! ProbLog model templating and the compiled-model cache.
//!
//! This crate only renders program *text*: annotated-disjunction fact blocks
//! with probability placeholders, the fixed addition rules, and a query or
//! evidence directive per label. Compiling that text is the job of an external
//! probabilistic-logic toolchain behind the [`ProgramCompiler`] seam; the
//! compiled artifacts are opaque here and cached per `(mode, label)` in a
//! caller-owned [`ModelCache`].

use std::collections::HashMap;

use crate::error::{ProgramError, ProgramResult};

/// The fixed rule text shared by the addition programs.
pub const ADDITION_RULES: &str = "addition(X,N) :- digit(X,1,N1), digit(X,2,N2), N is N1 + N2.\ndigits(X,Y) :- digit(img,1,X), digit(img,2,Y).";

/// Whether the target label is asked for or asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Query,
    Evidence,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Query, Mode::Evidence];
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Mode::Query => "query",
            Mode::Evidence => "evidence",
        })
    }
}

// ---------------------------------------------------------------------------
// Templating
// ---------------------------------------------------------------------------

/// One annotated-disjunction fact block per digit position.
///
/// Position `pos` (1-based) enumerates every digit value with a probability
/// placeholder `p_<pos><digit>`:
/// `p_10::digit(X,1,0); p_11::digit(X,1,1); ... .`
pub fn annotated_disjunctions(sequence_len: usize, n_digits: usize) -> Vec<String> {
    (1..=sequence_len)
        .map(|pos| {
            let facts: Vec<String> = (0..n_digits)
                .map(|digit| format!("p_{pos}{digit}::digit(X,{pos},{digit})"))
                .collect();
            format!("{}.", facts.join("; "))
        })
        .collect()
}

/// Assemble a full program: fact blocks, rules, an optional digit query, and
/// the label directive selected by `mode`.
pub fn compose_program(
    facts: &[String],
    rules: &str,
    label: usize,
    digit_query: Option<&str>,
    mode: Mode,
) -> String {
    let mut model = String::new();

    for (i, fact) in facts.iter().enumerate() {
        model.push_str(&format!("\n\n% Digit in position {}\n\n", i + 1));
        model.push_str(fact);
    }

    model.push_str("\n\n% Rules\n");
    model.push_str(rules);

    if let Some(digit_query) = digit_query {
        model.push_str("\n\n% Digit Query\n");
        model.push_str(&format!("query({digit_query})."));
    }

    match mode {
        Mode::Query => {
            model.push_str("\n\n% Addition Query\n");
            model.push_str(&format!("query(addition(img,{label}))."));
        }
        Mode::Evidence => {
            model.push_str("\n\n% Addition Evidence\n");
            model.push_str(&format!("evidence(addition(img,{label}))."));
        }
    }

    model
}

/// The label vocabulary of the addition task: sums `0..=2*(n_digits-1)`.
///
/// Only two-digit sequences have a defined vocabulary; anything else is a
/// loud error rather than a missing table entry.
pub fn addition_labels(sequence_len: usize, n_digits: usize) -> ProgramResult<Vec<usize>> {
    if sequence_len != 2 {
        return Err(ProgramError::UnsupportedSequenceLen { sequence_len });
    }
    if n_digits == 0 {
        return Ok(Vec::new());
    }
    Ok((0..=(n_digits - 1) * 2).collect())
}

// ---------------------------------------------------------------------------
// Compiler seam and model cache
// ---------------------------------------------------------------------------

/// The external logic-compilation toolchain boundary. Implementations turn a
/// rendered program into whatever compiled structure their inference engine
/// consumes; failures surface as [`ProgramError::Compile`].
pub trait ProgramCompiler {
    type Compiled;

    fn compile(&self, program: &str) -> ProgramResult<Self::Compiled>;
}

/// A caller-owned cache of compiled programs, eagerly populated for every
/// `(mode, label)` pair of the addition vocabulary. Ownership makes lifetime
/// and invalidation explicit; there is no ambient module state.
#[derive(Debug)]
pub struct ModelCache<C> {
    sequence_len: usize,
    n_digits: usize,
    models: HashMap<(Mode, usize), C>,
}

impl<C> ModelCache<C> {
    /// Render and compile one program per `(mode, label)` pair.
    pub fn build<P>(
        sequence_len: usize,
        n_digits: usize,
        compiler: &P,
    ) -> ProgramResult<Self>
    where
        P: ProgramCompiler<Compiled = C>,
    {
        let labels = addition_labels(sequence_len, n_digits)?;
        let facts = annotated_disjunctions(sequence_len, n_digits);

        let mut models = HashMap::with_capacity(2 * labels.len());
        for mode in Mode::ALL {
            for &label in &labels {
                let program =
                    compose_program(&facts, ADDITION_RULES, label, Some("digits(X,Y)"), mode);
                models.insert((mode, label), compiler.compile(&program)?);
            }
        }
        tracing::debug!(
            sequence_len,
            n_digits,
            models = models.len(),
            "compiled model cache"
        );
        Ok(Self {
            sequence_len,
            n_digits,
            models,
        })
    }

    pub fn sequence_len(&self) -> usize {
        self.sequence_len
    }

    pub fn n_digits(&self) -> usize {
        self.n_digits
    }

    /// Number of cached models (two modes per label).
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Look up the compiled model for a `(mode, label)` pair.
    pub fn get(&self, mode: Mode, label: usize) -> Option<&C> {
        self.models.get(&(mode, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test compiler that just records the program text.
    struct EchoCompiler;

    impl ProgramCompiler for EchoCompiler {
        type Compiled = String;

        fn compile(&self, program: &str) -> ProgramResult<Self::Compiled> {
            Ok(program.to_string())
        }
    }

    struct FailingCompiler;

    impl ProgramCompiler for FailingCompiler {
        type Compiled = ();

        fn compile(&self, _program: &str) -> ProgramResult<Self::Compiled> {
            Err(ProgramError::Compile {
                message: "no toolchain".into(),
            })
        }
    }

    #[test]
    fn annotated_disjunctions_enumerate_positions_and_digits() {
        let facts = annotated_disjunctions(2, 3);
        assert_eq!(facts.len(), 2);
        assert_eq!(
            facts[0],
            "p_10::digit(X,1,0); p_11::digit(X,1,1); p_12::digit(X,1,2)."
        );
        assert_eq!(
            facts[1],
            "p_20::digit(X,2,0); p_21::digit(X,2,1); p_22::digit(X,2,2)."
        );
    }

    #[test]
    fn compose_program_query_mode() {
        let facts = annotated_disjunctions(2, 2);
        let program = compose_program(&facts, ADDITION_RULES, 1, Some("digits(X,Y)"), Mode::Query);

        assert!(program.contains("% Digit in position 1"));
        assert!(program.contains("% Digit in position 2"));
        assert!(program.contains("% Rules"));
        assert!(program.contains("addition(X,N) :-"));
        assert!(program.contains("query(digits(X,Y))."));
        assert!(program.contains("query(addition(img,1))."));
        assert!(!program.contains("evidence("));
    }

    #[test]
    fn compose_program_evidence_mode() {
        let facts = annotated_disjunctions(2, 2);
        let program = compose_program(&facts, ADDITION_RULES, 2, None, Mode::Evidence);

        assert!(program.contains("evidence(addition(img,2))."));
        assert!(!program.contains("% Digit Query"));
        assert!(!program.contains("query("));
    }

    #[test]
    fn addition_labels_cover_the_sum_range() {
        assert_eq!(addition_labels(2, 10).unwrap(), (0..=18).collect::<Vec<_>>());
        assert_eq!(addition_labels(2, 2).unwrap(), vec![0, 1, 2]);
        assert!(matches!(
            addition_labels(3, 10).unwrap_err(),
            ProgramError::UnsupportedSequenceLen { sequence_len: 3 }
        ));
    }

    #[test]
    fn model_cache_populates_both_modes_eagerly() {
        let cache = ModelCache::build(2, 10, &EchoCompiler).unwrap();
        assert_eq!(cache.len(), 2 * 19);
        for mode in Mode::ALL {
            for label in 0..=18 {
                let program = cache.get(mode, label).unwrap();
                assert!(program.contains(&format!("addition(img,{label})")));
            }
        }
        assert!(cache.get(Mode::Query, 19).is_none());
    }

    #[test]
    fn model_cache_propagates_compile_failures() {
        let err = ModelCache::build(2, 4, &FailingCompiler).unwrap_err();
        assert!(matches!(err, ProgramError::Compile { .. }));
    }
}
