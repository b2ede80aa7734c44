//! The CFG oracle pass.

use crate::check::{CheckError, Expectation, Verdict};
use crate::oracle::{ExpectedCfg, OracleError};
use rhizome_arbor_ir::{Bundle, Function, IrError, NodeKinds, Visitor, walk, walk_function};
use rhizome_arbor_pass_abi::{Pass, PassError, PassInfo};
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// Verdict for one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionVerdict {
    pub function: String,
    pub verdict: Verdict,
}

/// Verdicts in visiting order. Checking stops at the first failure, so a
/// failed report ends with its only failing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub verdicts: Vec<FunctionVerdict>,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.verdicts.iter().all(|v| v.verdict.is_pass())
    }

    pub fn failure(&self) -> Option<&FunctionVerdict> {
        self.verdicts.iter().find(|v| !v.verdict.is_pass())
    }
}

/// Checks that function bodies contain the edges of an oracle literal.
///
/// The literal is decoded on every run, before the IR is touched. Without a
/// target function every function in the bundle is checked.
#[derive(Debug, Clone)]
pub struct CfgTransPass {
    info: PassInfo,
    banner: Option<String>,
    function: Option<String>,
    blocks: Option<usize>,
    literal: String,
    sigil: Option<char>,
}

impl CfgTransPass {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        literal: impl Into<String>,
    ) -> Self {
        Self {
            info: PassInfo::new(name, description),
            banner: None,
            function: None,
            blocks: None,
            literal: literal.into(),
            sigil: None,
        }
    }

    /// First line of output; the description when unset.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Only checks the function called `name`.
    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.function = Some(name.into());
        self
    }

    pub fn with_block_count(mut self, blocks: usize) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn with_sigil(mut self, sigil: char) -> Self {
        self.sigil = Some(sigil);
        self
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Decodes the literal.
    pub fn expectation(&self) -> Result<Expectation, OracleError> {
        let cfg = match self.sigil {
            Some(sigil) => ExpectedCfg::parse_with_sigil(&self.literal, sigil)?,
            None => ExpectedCfg::parse(&self.literal)?,
        };
        Ok(Expectation {
            blocks: self.blocks,
            cfg,
        })
    }

    /// Runs the check and returns the verdicts without printing anything.
    pub fn verify(&self, bundle: &Bundle) -> Result<Report, CheckError> {
        let expectation = self.expectation()?;
        let mut verifier = Verifier {
            expectation: &expectation,
            report: Report::default(),
        };
        let walked = match &self.function {
            Some(name) => walk_function(bundle.function(name)?, &mut verifier),
            None => walk(bundle, &mut verifier),
        };
        match walked {
            Ok(()) | Err(Halt::Failed) => Ok(verifier.report),
            Err(Halt::Error(err)) => Err(err.into()),
        }
    }

    /// Runs the check and writes the report to `out`.
    pub fn execute_to(&self, bundle: &Bundle, out: &mut dyn Write) -> Result<(), PassError> {
        let banner = self.banner.as_deref().unwrap_or(self.description());
        writeln!(out, "{banner}\n").map_err(PassError::fatal)?;

        let report = self.verify(bundle).map_err(PassError::fatal)?;
        for v in &report.verdicts {
            writeln!(out, "{}: {}", v.function, v.verdict).map_err(PassError::fatal)?;
        }
        match report.failure() {
            Some(failed) => {
                warn!(pass = self.name(), function = %failed.function, "check failed");
                Err(PassError::Failed(format!(
                    "{}: {}",
                    failed.function, failed.verdict
                )))
            }
            None => {
                writeln!(out, "Test passed!").map_err(PassError::fatal)?;
                info!(
                    pass = self.name(),
                    functions = report.verdicts.len(),
                    "check passed"
                );
                Ok(())
            }
        }
    }
}

impl Pass for CfgTransPass {
    fn info(&self) -> &PassInfo {
        &self.info
    }

    fn execute(&self, bundle: &Bundle) -> Result<(), PassError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.execute_to(bundle, &mut out)
    }
}

enum Halt {
    Failed,
    Error(IrError),
}

struct Verifier<'a> {
    expectation: &'a Expectation,
    report: Report,
}

impl Visitor for Verifier<'_> {
    type Error = Halt;

    fn interests(&self) -> NodeKinds {
        NodeKinds::FUNCTION
    }

    fn visit_function(&mut self, function: &Function) -> Result<(), Halt> {
        debug!(
            function = function.name(),
            edges = self.expectation.cfg.len(),
            "checking function"
        );
        let verdict = self
            .expectation
            .check(function.body())
            .map_err(Halt::Error)?;
        let failed = !verdict.is_pass();
        self.report.verdicts.push(FunctionVerdict {
            function: function.name().to_string(),
            verdict,
        });
        if failed { Err(Halt::Failed) } else { Ok(()) }
    }
}
