//! What the observability plugin logs during a run.

use std::ops::BitOr;

/// A set of named logging switches.
///
/// The grouped constants [`CODE`](LoggingOptions::CODE),
/// [`DIAGNOSTICS`](LoggingOptions::DIAGNOSTICS) and
/// [`ALL`](LoggingOptions::ALL) combine the individual ones; options can be
/// united with `|`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LoggingOptions {
    /// Decorated test fragments, with line numbers.
    pub tested_code: bool,
    /// Trees added by generators, with line numbers.
    pub generated_code: bool,
    pub analyzer_diagnostics: bool,
    pub generator_diagnostics: bool,
    pub final_diagnostics: bool,
}

impl LoggingOptions {
    pub const NONE: Self = Self {
        tested_code: false,
        generated_code: false,
        analyzer_diagnostics: false,
        generator_diagnostics: false,
        final_diagnostics: false,
    };

    pub const TESTED_CODE: Self = Self {
        tested_code: true,
        ..Self::NONE
    };

    pub const GENERATED_CODE: Self = Self {
        generated_code: true,
        ..Self::NONE
    };

    pub const ANALYZER_DIAGNOSTICS: Self = Self {
        analyzer_diagnostics: true,
        ..Self::NONE
    };

    pub const GENERATOR_DIAGNOSTICS: Self = Self {
        generator_diagnostics: true,
        ..Self::NONE
    };

    pub const FINAL_DIAGNOSTICS: Self = Self {
        final_diagnostics: true,
        ..Self::NONE
    };

    /// Tested and generated code.
    pub const CODE: Self = Self::TESTED_CODE.union(Self::GENERATED_CODE);

    /// Analyzer, generator and final diagnostics.
    pub const DIAGNOSTICS: Self = Self::ANALYZER_DIAGNOSTICS
        .union(Self::GENERATOR_DIAGNOSTICS)
        .union(Self::FINAL_DIAGNOSTICS);

    pub const ALL: Self = Self::CODE.union(Self::DIAGNOSTICS);

    /// Options enabled in either `self` or `other`.
    pub const fn union(self, other: Self) -> Self {
        Self {
            tested_code: self.tested_code || other.tested_code,
            generated_code: self.generated_code || other.generated_code,
            analyzer_diagnostics: self.analyzer_diagnostics || other.analyzer_diagnostics,
            generator_diagnostics: self.generator_diagnostics || other.generator_diagnostics,
            final_diagnostics: self.final_diagnostics || other.final_diagnostics,
        }
    }

    /// True if every option enabled in `other` is enabled in `self`.
    pub const fn contains(self, other: Self) -> bool {
        (self.tested_code || !other.tested_code)
            && (self.generated_code || !other.generated_code)
            && (self.analyzer_diagnostics || !other.analyzer_diagnostics)
            && (self.generator_diagnostics || !other.generator_diagnostics)
            && (self.final_diagnostics || !other.final_diagnostics)
    }

    pub const fn is_empty(self) -> bool {
        !(self.tested_code || self.generated_code || self.has_any_diagnostics())
    }

    pub const fn has_any_diagnostics(self) -> bool {
        self.analyzer_diagnostics || self.generator_diagnostics || self.final_diagnostics
    }
}

impl BitOr for LoggingOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}
