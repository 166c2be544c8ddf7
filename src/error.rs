//! Rich diagnostic error types for seshat.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know exactly what went wrong and
//! how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for seshat.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum SeshatError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Logic(#[from] LogicError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// World enumeration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum WorldError {
    #[error("empty world space: {num_variables} variable(s) over a domain of {domain_size}")]
    #[diagnostic(
        code(seshat::world::empty),
        help(
            "A world space needs at least one variable and a non-empty domain. \
             Pass domain_size >= 1 and num_variables >= 1."
        )
    )]
    EmptySpace {
        domain_size: usize,
        num_variables: usize,
    },

    #[error("domain of {domain_size} values does not fit a single component")]
    #[diagnostic(
        code(seshat::world::domain_too_large),
        help("World components are stored as u8; use a domain of at most 256 values.")
    )]
    DomainTooLarge { domain_size: usize },

    #[error("world space overflows: {domain_size}^{num_variables} exceeds addressable indices")]
    #[diagnostic(
        code(seshat::world::too_large),
        help(
            "The Cartesian product is larger than usize can index. \
             Reduce the domain size or the number of variables."
        )
    )]
    TooLarge {
        domain_size: usize,
        num_variables: usize,
    },

    #[error("world index {index} out of range for a space of {len} worlds")]
    #[diagnostic(
        code(seshat::world::index_out_of_range),
        help("Valid indices are 0..len. Check the index against WorldSpace::len().")
    )]
    IndexOutOfRange { index: usize, len: usize },

    #[error("world tuple has {actual} component(s), space has {expected} variable(s)")]
    #[diagnostic(
        code(seshat::world::bad_tuple),
        help("Provide exactly one component per variable, each within the domain.")
    )]
    BadTuple { expected: usize, actual: usize },

    #[error("component value {value} outside domain 0..{domain_size}")]
    #[diagnostic(
        code(seshat::world::value_out_of_domain),
        help("Every component of a world tuple must be smaller than the domain size.")
    )]
    ValueOutOfDomain { value: u8, domain_size: usize },
}

// ---------------------------------------------------------------------------
// Task errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum TaskError {
    #[error("unknown task: \"{name}\"")]
    #[diagnostic(
        code(seshat::task::unknown),
        help("List the available task names with `seshat tasks`.")
    )]
    UnknownTask { name: String },

    #[error("task \"{task}\" expects {expected} variable(s), got {actual}")]
    #[diagnostic(
        code(seshat::task::arity_mismatch),
        help(
            "This task decodes a fixed number of latent variables per world. \
             Adjust sequence_len / n_concepts to match the task."
        )
    )]
    ArityMismatch {
        task: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    World(#[from] WorldError),
}

// ---------------------------------------------------------------------------
// Gate / logic errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LogicError {
    #[error("gate expects {expected} joint world(s), distributions span {actual}")]
    #[diagnostic(
        code(seshat::logic::gate_shape),
        help(
            "The product of the per-variable class counts must equal the gate's row count. \
             Build the gate with or_gate/and_gate/equality_gate matching the variables."
        )
    )]
    GateShape { expected: usize, actual: usize },

    #[error("distribution for variable {index} has {len} class(es), expected {expected}")]
    #[diagnostic(
        code(seshat::logic::distribution_shape),
        help("All per-variable distributions passed to a gate must have the same class count.")
    )]
    DistributionShape {
        index: usize,
        len: usize,
        expected: usize,
    },

    #[error("concept vector has {actual} probabilities, layout expects {expected}")]
    #[diagnostic(
        code(seshat::logic::concept_shape),
        help(
            "The driving concept layout is fixed: 21 binary concepts as 42 probabilities \
             (negative/positive pair per concept)."
        )
    )]
    ConceptShape { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// Program templating errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ProgramError {
    #[error("no label vocabulary defined for sequence length {sequence_len}")]
    #[diagnostic(
        code(seshat::program::unsupported_sequence_len),
        help(
            "The addition label vocabulary is defined for sequences of exactly 2 digits \
             (labels 0..=2*(n_digits-1)). Other lengths have no compiled-model table."
        )
    )]
    UnsupportedSequenceLen { sequence_len: usize },

    #[error("program compilation failed: {message}")]
    #[diagnostic(
        code(seshat::program::compile),
        help(
            "The external logic toolchain rejected the templated program. \
             Inspect the program text with `seshat program` and check the toolchain's own logs."
        )
    )]
    Compile { message: String },
}

// ---------------------------------------------------------------------------
// Run-ledger errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LedgerError {
    #[error("ledger I/O error at {path}: {source}")]
    #[diagnostic(
        code(seshat::ledger::io),
        help(
            "A filesystem operation on the run ledger failed. Check that the experiment \
             directory exists, has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger header mismatch in {path}")]
    #[diagnostic(
        code(seshat::ledger::header),
        help(
            "The CSV header on disk does not match this ledger's schema. The file was \
             probably written by a different experiment class; use a separate directory."
        )
    )]
    Header { path: String },

    #[error("malformed ledger row {line} in {path}: {message}")]
    #[diagnostic(
        code(seshat::ledger::parse),
        help("Each row must have one value per header column. Repair or remove the row.")
    )]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    #[error("row has {actual} value(s) for schema section \"{section}\", expected {expected}")]
    #[diagnostic(
        code(seshat::ledger::schema_mismatch),
        help("Provide one value per declared parameter and metric column, in schema order.")
    )]
    SchemaMismatch {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("could not acquire ledger lock {path} within {waited_secs} s")]
    #[diagnostic(
        code(seshat::ledger::lock_timeout),
        help(
            "Another live process holds the ledger lock. If no writer is running, the \
             sentinel is stale with a recycled PID; remove the lock file by hand."
        )
    )]
    LockTimeout { path: String, waited_secs: u64 },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read task config: {path}")]
    #[diagnostic(
        code(seshat::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse task config: {path}")]
    #[diagnostic(
        code(seshat::config::parse),
        help("Check the TOML syntax in the task config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write task config: {path}")]
    #[diagnostic(
        code(seshat::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for functions returning seshat results.
pub type SeshatResult<T> = std::result::Result<T, SeshatError>;

pub type WorldResult<T> = std::result::Result<T, WorldError>;
pub type TaskResult<T> = std::result::Result<T, TaskError>;
pub type LogicResult<T> = std::result::Result<T, LogicError>;
pub type ProgramResult<T> = std::result::Result<T, ProgramError>;
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
