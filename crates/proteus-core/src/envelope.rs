//! Input and output envelopes carried through the pipeline.

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, Diagnostics};

/// A request payload paired with the diagnostics accumulated so far.
///
/// Diagnostics can only be appended; nothing removes them once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input<T> {
    data: T,
    validations: Vec<Diagnostic>,
}

impl<T> Input<T> {
    /// Wraps a payload with no diagnostics.
    pub fn new(data: T) -> Self {
        Self {
            data,
            validations: Vec::new(),
        }
    }

    /// Returns the payload.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns the diagnostics recorded so far.
    pub fn validations(&self) -> &[Diagnostic] {
        &self.validations
    }

    /// Appends the diagnostics of a failed validation step.
    pub fn record(&mut self, diagnostics: Diagnostics) {
        self.validations.extend(diagnostics);
    }

    /// Returns `true` if any recorded diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.validations.iter().any(Diagnostic::is_error)
    }

    /// Consumes the envelope, returning payload and diagnostics.
    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.data, self.validations)
    }
}

/// Diagnostics of a finished run, split by the side that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputValidations {
    /// Diagnostics from the input and security stages.
    pub input: Vec<Diagnostic>,
    /// Diagnostics from the output stage.
    pub output: Vec<Diagnostic>,
}

/// The terminal envelope of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output<T> {
    output: T,
    validations: OutputValidations,
}

impl<T> Output<T> {
    pub(crate) fn assemble(
        output: T,
        input: Vec<Diagnostic>,
        output_validations: Vec<Diagnostic>,
    ) -> Self {
        Self {
            output,
            validations: OutputValidations {
                input,
                output: output_validations,
            },
        }
    }

    /// Returns the produced response.
    pub fn output(&self) -> &T {
        &self.output
    }

    /// Returns the split diagnostics.
    pub fn validations(&self) -> &OutputValidations {
        &self.validations
    }

    /// Consumes the envelope.
    pub fn into_parts(self) -> (T, OutputValidations) {
        (self.output, self.validations)
    }
}
