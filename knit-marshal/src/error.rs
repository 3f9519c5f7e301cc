//! Error type for registration and marshalling.

use core::fmt::{self, Display};

use knit_json::ParseError;

/// A step from an aggregate into one of its parts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field of an aggregate
    Field(String),
    /// An element of an array
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{name}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Error returned by the registry and by dispatch.
#[derive(Debug)]
pub struct MarshalError {
    /// The specific kind of error
    pub kind: MarshalErrorKind,
    /// Where in the value the error happened, outermost step first
    pub path: Vec<PathSegment>,
}

impl MarshalError {
    /// Create a new error at the root
    pub const fn new(kind: MarshalErrorKind) -> Self {
        MarshalError {
            kind,
            path: Vec::new(),
        }
    }

    /// Add a path segment (prepends since we unwind from error site)
    pub fn with_path(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Shorthand for [`MarshalError::with_path`] with a field name.
    pub fn in_field(self, name: &str) -> Self {
        self.with_path(PathSegment::Field(name.to_owned()))
    }

    /// Format the path as a string, `.` for the root
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            return ".".into();
        }
        self.path.iter().map(ToString::to_string).collect()
    }
}

impl Display for MarshalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "at {}: {}", self.path_string(), self.kind)
        }
    }
}

impl std::error::Error for MarshalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            MarshalErrorKind::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl miette::Diagnostic for MarshalError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        match &self.kind {
            MarshalErrorKind::UnknownType {
                suggestion: Some(s),
                ..
            } => Some(Box::new(format!("did you mean `{s}`?"))),
            _ => None,
        }
    }

    fn diagnostic_source(&self) -> Option<&dyn miette::Diagnostic> {
        match &self.kind {
            MarshalErrorKind::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for MarshalError {
    fn from(err: ParseError) -> Self {
        MarshalError::new(MarshalErrorKind::Parse(err))
    }
}

/// Specific error kinds for marshalling
#[derive(Debug)]
pub enum MarshalErrorKind {
    /// The input text was not valid JSON
    Parse(ParseError),
    /// No builtin or registered entry has this name
    UnknownType {
        /// The name that was looked up
        name: String,
        /// A similarly spelled known name, if any
        suggestion: Option<String>,
    },
    /// A name was registered twice
    DuplicateRegistration {
        /// The name already taken
        name: String,
    },
    /// An entry must have one or two names
    InvalidAliases {
        /// How many names were given
        count: usize,
    },
    /// The JSON value has the wrong shape for the requested type
    TypeMismatch {
        /// The requested type
        type_name: String,
        /// What the type accepts
        expected: &'static str,
        /// What was found
        got: &'static str,
    },
    /// A required field received `null` or was absent
    RequiredFieldNull {
        /// The field's declared type
        type_name: String,
    },
    /// A number does not fit the requested type
    NumberOutOfRange {
        /// The requested type
        type_name: String,
        /// The number as found
        value: String,
    },
    /// The host value handed to dispatch is not the type registered under this name
    HostTypeMismatch {
        /// The requested type
        type_name: String,
        /// The host type the entry works with
        expected: &'static str,
    },
    /// A buffer could not grow
    AllocationFailure,
    /// The global registry was already set
    RegistryInstalled,
}

impl Display for MarshalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshalErrorKind::Parse(err) => write!(f, "invalid JSON: {err}"),
            MarshalErrorKind::UnknownType { name, suggestion } => {
                write!(f, "unknown type `{name}`")?;
                if let Some(suggested) = suggestion {
                    write!(f, " (did you mean `{suggested}`?)")?;
                }
                Ok(())
            }
            MarshalErrorKind::DuplicateRegistration { name } => {
                write!(f, "type `{name}` is already registered")
            }
            MarshalErrorKind::InvalidAliases { count } => {
                write!(f, "an entry needs one or two names, got {count}")
            }
            MarshalErrorKind::TypeMismatch {
                type_name,
                expected,
                got,
            } => write!(f, "`{type_name}` expects {expected}, got {got}"),
            MarshalErrorKind::RequiredFieldNull { type_name } => {
                write!(f, "required field of type `{type_name}` is null or missing")
            }
            MarshalErrorKind::NumberOutOfRange { type_name, value } => {
                write!(f, "number {value} out of range for `{type_name}`")
            }
            MarshalErrorKind::HostTypeMismatch {
                type_name,
                expected,
            } => write!(f, "value passed as `{type_name}` is not a {expected}"),
            MarshalErrorKind::AllocationFailure => write!(f, "out of memory"),
            MarshalErrorKind::RegistryInstalled => {
                write!(f, "the global registry is already installed")
            }
        }
    }
}

impl MarshalErrorKind {
    /// Get an error code for this kind of error.
    pub const fn code(&self) -> &'static str {
        match self {
            MarshalErrorKind::Parse(_) => "marshal::parse",
            MarshalErrorKind::UnknownType { .. } => "marshal::unknown_type",
            MarshalErrorKind::DuplicateRegistration { .. } => "marshal::duplicate_registration",
            MarshalErrorKind::InvalidAliases { .. } => "marshal::invalid_aliases",
            MarshalErrorKind::TypeMismatch { .. } => "marshal::type_mismatch",
            MarshalErrorKind::RequiredFieldNull { .. } => "marshal::required_field_null",
            MarshalErrorKind::NumberOutOfRange { .. } => "marshal::number_out_of_range",
            MarshalErrorKind::HostTypeMismatch { .. } => "marshal::host_type_mismatch",
            MarshalErrorKind::AllocationFailure => "marshal::allocation_failure",
            MarshalErrorKind::RegistryInstalled => "marshal::registry_installed",
        }
    }

    /// Get a short label for this kind of error.
    pub fn label(&self) -> String {
        match self {
            MarshalErrorKind::Parse(err) => err.kind.label(),
            MarshalErrorKind::UnknownType { name, .. } => format!("no entry named `{name}`"),
            MarshalErrorKind::DuplicateRegistration { name } => format!("`{name}` taken"),
            MarshalErrorKind::InvalidAliases { .. } => "one or two names".into(),
            MarshalErrorKind::TypeMismatch { expected, .. } => format!("expected {expected}"),
            MarshalErrorKind::RequiredFieldNull { .. } => "required".into(),
            MarshalErrorKind::NumberOutOfRange { type_name, .. } => {
                format!("out of range for `{type_name}`")
            }
            MarshalErrorKind::HostTypeMismatch { expected, .. } => format!("expected {expected}"),
            MarshalErrorKind::AllocationFailure => "allocation failed".into(),
            MarshalErrorKind::RegistryInstalled => "already installed".into(),
        }
    }
}

/// Result type for marshalling
pub type Result<T> = core::result::Result<T, MarshalError>;
