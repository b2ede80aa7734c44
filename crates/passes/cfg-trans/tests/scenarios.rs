//! End-to-end oracle checks against small function bodies.

use rhizome_arbor_ir::{Bundle, BundleBuilder, IrError};
use rhizome_arbor_pass_abi::Pass;
use rhizome_arbor_pass_cfg_trans::{
    CfgTransPass, CheckError, ExpectedCfg, Mismatch, OracleError, Verdict, capture_trans,
};

/// One function `f` with the given blocks and edges.
fn cfg(blocks: &[&str], edges: &[(&str, &str)]) -> Bundle {
    let mut builder = BundleBuilder::new("scenario");
    builder
        .function("f", |code| {
            for name in blocks {
                code.block(*name)?;
            }
            for (from, to) in edges {
                code.edge_by_name(from, to)?;
            }
            Ok(())
        })
        .unwrap();
    builder.build()
}

fn verdict(literal: &str, bundle: &Bundle) -> Result<Verdict, CheckError> {
    let report = CfgTransPass::new("scenario", "", literal).verify(bundle)?;
    Ok(report.verdicts[0].verdict.clone())
}

#[test]
fn test_present_edge_passes() {
    let bundle = cfg(&["a", "b"], &[("a", "b")]);
    assert_eq!(verdict("(trans (edge (a) (b)))", &bundle), Ok(Verdict::Pass));
}

#[test]
fn test_absent_edge_fails_at_first_entry() {
    let bundle = cfg(&["a", "b", "c"], &[("a", "c")]);
    assert_eq!(
        verdict("(trans (edge (a) (b)) (edge (a) (c)))", &bundle),
        Ok(Verdict::Fail(Mismatch::MissingEdge {
            src: "a".into(),
            dest: "b".into()
        }))
    );

    let pass = CfgTransPass::new("scenario", "", "(trans (edge (a) (b)))");
    let err = pass.execute(&bundle).unwrap_err();
    assert!(err.is_verdict());
    assert!(err.to_string().contains("'b' is not a successor of 'a'"));
}

#[test]
fn test_unknown_block_is_fatal() {
    let bundle = cfg(&["x", "y"], &[("x", "y")]);
    assert_eq!(
        verdict("(trans (edge (a) (b)))", &bundle),
        Err(CheckError::Ir(IrError::NotFound("a".into())))
    );

    let pass = CfgTransPass::new("scenario", "", "(trans (edge (a) (b)))");
    assert!(!pass.execute(&bundle).unwrap_err().is_verdict());
}

#[test]
fn test_empty_oracle_is_vacuous_but_count_still_applies() {
    let bundle = cfg(&["a", "b"], &[]);
    assert_eq!(verdict("(trans)", &bundle), Ok(Verdict::Pass));

    let gated = CfgTransPass::new("scenario", "", "(trans)").with_block_count(5);
    let report = gated.verify(&bundle).unwrap();
    assert_eq!(
        report.verdicts[0].verdict,
        Verdict::Fail(Mismatch::BlockCount {
            expected: 5,
            actual: 2
        })
    );
}

#[test]
fn test_malformed_entry_is_fatal_not_fail() {
    let bundle = cfg(&["a", "b"], &[("a", "b")]);
    assert_eq!(
        verdict("(trans (edge (a) b))", &bundle),
        Err(CheckError::Oracle(OracleError::MalformedEntry {
            index: 1,
            entry: "(edge (a) b)".into()
        }))
    );

    let pass = CfgTransPass::new("scenario", "", "(trans (edge (a) b))");
    assert!(!pass.execute(&bundle).unwrap_err().is_verdict());
}

#[test]
fn test_malformed_entry_reported_before_any_lookup() {
    // The first entry names a missing block; the second is malformed.
    let bundle = cfg(&["a"], &[]);
    assert!(matches!(
        verdict("(trans (edge (zzz) (a)) (edge a))", &bundle),
        Err(CheckError::Oracle(OracleError::MalformedEntry { index: 2, .. }))
    ));
}

#[test]
fn test_deterministic() {
    let bundle = cfg(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
    let pass = CfgTransPass::new("scenario", "", "(trans (edge (a) (b)) (edge (b) (a)))");
    let first = pass.verify(&bundle).unwrap();
    for _ in 0..10 {
        assert_eq!(pass.verify(&bundle).unwrap(), first);
    }
}

#[test]
fn test_captured_oracle_passes() {
    let bundle = cfg(
        &["entry", "loop", "body", "exit"],
        &[("entry", "loop"), ("loop", "body"), ("body", "loop"), ("loop", "exit")],
    );
    let body = bundle.function("f").unwrap().body();
    let captured = capture_trans(body);
    assert_eq!(
        captured.to_string(),
        "(trans (edge (body) (loop)) (edge (entry) (loop)) (edge (loop) (body)) (edge (loop) (exit)))"
    );

    let cfg = ExpectedCfg::from_sexpr(&captured).unwrap();
    assert_eq!(cfg.len(), body.edge_count());

    let pass =
        CfgTransPass::new("captured", "", captured.to_string()).with_block_count(body.len());
    assert!(pass.verify(&bundle).unwrap().passed());
}
